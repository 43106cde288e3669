use common_logger::{ErrorLogger, LogFormat, LoggerConfig, RingBufferLayer};

fn add_campaign(name: &str) -> Result<(), String> {
    // Simulate a storage failure raised with a coded error
    if name.is_empty() {
        return Err("10000;(collection) MySQL fatal error".to_owned());
    }
    Ok(())
}

fn main() {
    // Keep the last 100 records in memory next to the JSON output
    let recent = RingBufferLayer::new(100, 2048);
    let logger = match LoggerConfig::new()
        .format(LogFormat::default())
        .ring_buffer(recent.clone())
        .build()
    {
        Ok(dispatch) => ErrorLogger::new(dispatch),
        Err(e) => {
            eprintln!("logger setup failed: {}", e);
            return;
        }
    };

    println!("--- Basic Usage Example ---\n");

    logger.info("campaign-requested", &["campaignName", ""]);

    if let Err(err) = add_campaign("") {
        let result = logger.error(
            err,
            "errcon HY2000 mysql host not found!",
            "AddCampaign.MYSQL_FATAL_ERROR",
            &["campaignName", ""],
        );

        // SCENARIO 1: What the caller hands back to the user
        println!("\n1. [RESPONSE] What the user sees:");
        match result.response_error() {
            Some(response) => println!("   \"{}\"", response),
            None => println!("   \"internal error (id: {})\"", result.identifier()),
        }

        // SCENARIO 2: The operator looks the record up by identifier
        println!("\n2. [LOOKUP] What the operator finds for {}:", result.identifier());
        if let Some(entry) = recent.find_by_identifier(result.identifier().as_str()) {
            for (key, value) in entry.fields.iter() {
                println!("   {:<18} {}", key, value);
            }
        }
    }
}
