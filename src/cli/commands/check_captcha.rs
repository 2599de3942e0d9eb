use crate::clients::{CaseSource, CourtClient};
use crate::config::Config;

pub async fn cmd_check_captcha(config: &Config) -> anyhow::Result<()> {
    let client = CourtClient::new(&config.scraper)?;
    println!("Loading search form: {}", client.search_url());

    let probe = client.probe_captcha().await?;

    println!("Form action: {}", probe.form_action);
    match (probe.kind, probe.value.as_deref()) {
        ("numeric", Some(value)) => println!("✓ Numeric CAPTCHA detected: {value}"),
        ("image", _) => println!("✗ Image CAPTCHA detected; searches will fail until it is removed"),
        _ => println!("No CAPTCHA on the search form"),
    }

    Ok(())
}
