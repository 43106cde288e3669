//! End-to-end behaviour of the error normalizer and info logger.
//!
//! Records are captured with a ring buffer so emitted fields can be checked
//! alongside the returned results.

use common_logger::{
    Attributes, ErrorLogger, ErrorResult, IDENTIFIER_LEN, LOG_ERROR_INVALID_ARGS,
    LOG_INFO_INVALID_ARGS, LOG_TARGET, LogHelper, Loggable, RingBufferLayer, log_error,
    log_error_with, log_info,
};
use regex::Regex;
use std::error::Error;
use std::fmt;
use tracing::{Dispatch, Level};
use tracing_subscriber::layer::SubscriberExt;
use uuid::Uuid;

const DETAIL: &str = "errcon HY2000 mysql host not found!";
const CONTEXT: &str = "AddCampaign.MYSQL_FATAL_ERROR";

#[derive(Debug, Clone, PartialEq, Eq)]
struct DummyError(&'static str);

impl fmt::Display for DummyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl Error for DummyError {}

fn capture() -> (Dispatch, RingBufferLayer) {
    let sink = RingBufferLayer::new(64, 4096);
    let logger = Dispatch::new(tracing_subscriber::registry().with(sink.clone()));
    (logger, sink)
}

fn assert_valid_identifier<E>(result: &ErrorResult<E>) {
    let alphanumeric = Regex::new(r"^[a-zA-Z0-9]+$").unwrap();
    assert_eq!(result.identifier().len(), IDENTIFIER_LEN);
    assert!(alphanumeric.is_match(result.identifier().as_str()));
}

// ============================================================================
// INFO
// ============================================================================

#[test]
fn info_log_with_pairs() {
    let (logger, sink) = capture();
    let creator = Uuid::new_v4().to_string();
    let campaign = Uuid::new_v4().to_string();

    log_info(
        &logger,
        "submission-created",
        &["campaignCreatorUUID", creator.as_str(), "campaignUUID", campaign.as_str()],
    );

    let entry = &sink.get_all()[0];
    assert_eq!(entry.level, Level::INFO);
    assert_eq!(entry.target.as_ref(), LOG_TARGET);
    assert_eq!(entry.message.as_ref(), "submission-created");

    let args: serde_json::Value = serde_json::from_str(entry.field("args").unwrap()).unwrap();
    assert_eq!(args["campaignCreatorUUID"], creator.as_str());
    assert_eq!(args["campaignUUID"], campaign.as_str());
}

#[test]
fn info_log_with_odd_pairs_emits_notice_only() {
    let (logger, sink) = capture();
    let creator = Uuid::new_v4().to_string();

    log_info(
        &logger,
        "submission-created",
        &["campaignCreatorUUID", creator.as_str(), "campaignUUID"],
    );

    let entries = sink.get_all();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].message.as_ref(), LOG_INFO_INVALID_ARGS);
    assert!(!entries[0].field("args").unwrap().contains(&creator));
}

// ============================================================================
// ERROR: coded
// ============================================================================

#[test]
fn coded_error_returns_full_result() {
    let (logger, sink) = capture();
    let dummy = DummyError("10000;(collection) MySQL fatal error");
    let collection = Uuid::new_v4().to_string();
    let campaign = Uuid::new_v4().to_string();

    let result = log_error(
        Some(&logger),
        Some(dummy.clone()),
        DETAIL,
        CONTEXT,
        &["collectionUUID", collection.as_str(), "campaignUUID", campaign.as_str()],
    )
    .expect("result for present inputs");

    assert_eq!(result.source_error(), &dummy);
    assert_eq!(result.context(), CONTEXT);
    assert_valid_identifier(&result);

    let response = result.response_error().expect("coded errors carry a response");
    assert_eq!(
        response.as_str(),
        format!("10000;(collection) MySQL fatal error;{}", result.identifier())
    );

    let entry = sink
        .find_by_identifier(result.identifier().as_str())
        .expect("record findable by identifier");
    assert_eq!(entry.level, Level::ERROR);
    assert_eq!(entry.message.as_ref(), dummy.0);
    assert_eq!(entry.field("error.logsource"), Some("collection"));
    assert_eq!(entry.field("error.code"), Some("10000"));
    assert_eq!(entry.field("error.message"), Some("(collection) MySQL fatal error"));
    assert_eq!(entry.field("error.detail"), Some(DETAIL));
    assert_eq!(entry.field("error.context"), Some(CONTEXT));

    let args: serde_json::Value = serde_json::from_str(entry.field("args").unwrap()).unwrap();
    assert_eq!(args["collectionUUID"], collection.as_str());
}

#[test]
fn odd_pairs_still_return_result() {
    let (logger, sink) = capture();
    let collection = Uuid::new_v4().to_string();

    let result = log_error(
        Some(&logger),
        Some(DummyError("10000;(collection) MySQL fatal error")),
        DETAIL,
        CONTEXT,
        &["collectionUUID", collection.as_str(), "campaignUUID"],
    )
    .expect("odd pairs degrade, they do not fail");

    assert_valid_identifier(&result);
    assert!(result.response_error().is_some());

    // oldest first: notice, then the error record with an empty group
    let entries = sink.get_filtered(|_| true);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].level, Level::INFO);
    assert_eq!(entries[0].message.as_ref(), LOG_ERROR_INVALID_ARGS);
    assert_eq!(entries[1].level, Level::ERROR);
    assert_eq!(entries[1].field("args"), Some("{}"));
}

#[test]
fn unbalanced_parens_give_empty_logsource() {
    let (logger, sink) = capture();

    let result = log_error(
        Some(&logger),
        Some(DummyError("10000;(collection MySQL fatal error")),
        DETAIL,
        CONTEXT,
        &["collectionUUID", "c", "campaignUUID", "d"],
    )
    .expect("result");

    assert_valid_identifier(&result);
    assert!(result.response_error().is_some());

    let entry = sink.find_by_identifier(result.identifier().as_str()).unwrap();
    assert_eq!(entry.field("error.logsource"), Some(""));
}

// ============================================================================
// ERROR: uncoded
// ============================================================================

#[test]
fn uncoded_error_has_no_response() {
    let (logger, sink) = capture();

    let result = log_error(
        Some(&logger),
        Some(DummyError("(commonpagination) Redis fatal error!")),
        DETAIL,
        CONTEXT,
        &[],
    )
    .expect("result");

    assert_valid_identifier(&result);
    assert!(result.response_error().is_none());

    let entry = &sink.get_recent(1)[0];
    assert_eq!(entry.field("error.logsource"), Some("commonpagination"));
    assert_eq!(entry.field("error.message"), Some("(commonpagination) Redis fatal error!"));
    assert_eq!(entry.field("error.code"), None);
    assert_eq!(entry.field("error.identifier"), None);
    assert!(sink.find_by_identifier(result.identifier().as_str()).is_none());
}

// ============================================================================
// ABSENT INPUTS
// ============================================================================

#[test]
fn absent_logger_or_error_is_noop() {
    let (logger, sink) = capture();

    assert!(log_error(None, Some(DummyError("1;x")), DETAIL, CONTEXT, &[]).is_none());
    assert!(log_error::<DummyError>(Some(&logger), None, DETAIL, CONTEXT, &[]).is_none());
    // odd pairs do not trigger the notice when inputs are absent
    assert!(log_error::<DummyError>(Some(&logger), None, DETAIL, CONTEXT, &["k"]).is_none());

    assert!(sink.is_empty());
}

// ============================================================================
// IDENTIFIERS
// ============================================================================

#[test]
fn consecutive_calls_get_distinct_identifiers() {
    let (logger, _sink) = capture();
    let first = log_error(Some(&logger), Some("1;x"), DETAIL, CONTEXT, &[]).unwrap();
    let second = log_error(Some(&logger), Some("1;x"), DETAIL, CONTEXT, &[]).unwrap();
    assert_ne!(first.identifier(), second.identifier());
}

#[test]
fn boxed_errors_are_accepted() {
    let (logger, _sink) = capture();
    let err: Box<dyn Error + Send + Sync> = "500;(upstream) bad gateway".into();

    let result = log_error(Some(&logger), Some(err), DETAIL, CONTEXT, &[]).unwrap();
    assert_eq!(result.into_source().to_string(), "500;(upstream) bad gateway");
}

// ============================================================================
// CALLBACK HOOK
// ============================================================================

#[derive(Debug, Clone)]
struct Submission {
    uuid: String,
    caption: String,
}

impl Loggable for Submission {
    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("uuid", self.uuid.as_str())
            .with("caption", self.caption.as_str())
    }
}

fn set_redis<H>(logger: &Dispatch, submission: &Submission, helper: H) -> Option<ErrorResult<DummyError>>
where
    H: LogHelper<Submission, DummyError>,
{
    helper.log(
        Some(logger),
        Some(DummyError("10000;(commonlogger) test error")),
        "error detail",
        "TestParticipantSetRedis.Error",
        submission,
    )
}

#[test]
fn callback_helper_logs_payload() {
    let (logger, sink) = capture();
    let submission = Submission {
        uuid: Uuid::new_v4().to_string(),
        caption: "dummy caption".to_owned(),
    };

    let result = set_redis(&logger, &submission, log_error_with::<Submission, DummyError>)
        .expect("result");

    let entry = sink.find_by_identifier(result.identifier().as_str()).unwrap();
    let args: serde_json::Value = serde_json::from_str(entry.field("args").unwrap()).unwrap();
    assert_eq!(args["uuid"], submission.uuid.as_str());
    assert_eq!(args["caption"], "dummy caption");
    assert_eq!(entry.field("error.logsource"), Some("commonlogger"));
}

#[test]
fn error_logger_handle() {
    let (logger, sink) = capture();
    let logger = ErrorLogger::new(logger);
    let submission = Submission {
        uuid: "u-1".to_owned(),
        caption: "c".to_owned(),
    };

    logger.info("started", &[]);
    let result = logger.error_with(DummyError("7;(jobs) stuck"), "d", "Job.Run", &submission);

    assert_eq!(result.context(), "Job.Run");
    assert_eq!(sink.len(), 2);
    assert_eq!(
        sink.find_by_identifier(result.identifier().as_str())
            .and_then(|e| e.field("error.code").map(str::to_owned)),
        Some("7".to_owned())
    );
}

// ============================================================================
// ISOLATION
// ============================================================================

#[test]
fn concurrent_loggers_do_not_cross() {
    let handles: Vec<_> = (0..4)
        .map(|t| {
            std::thread::spawn(move || {
                let (logger, sink) = capture();
                for i in 0..50 {
                    let text = format!("{};(thread{}) failure", i, t);
                    let _ = log_error(Some(&logger), Some(text), "", "ctx", &[]);
                }
                sink
            })
        })
        .collect();

    for (t, handle) in handles.into_iter().enumerate() {
        let sink = handle.join().expect("thread panicked");
        let expected = format!("thread{}", t);
        assert_eq!(sink.len(), 50);
        assert!(
            sink.get_all()
                .iter()
                .all(|e| e.field("error.logsource") == Some(expected.as_str()))
        );
    }
}
