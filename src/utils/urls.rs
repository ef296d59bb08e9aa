use url::Url;

/// Checks that `input` parses as an absolute http(s) URL.
pub fn validate_full_url(input: &str) -> Result<(), String> {
    let url = Url::parse(input).map_err(|_| "Invalid URL.".to_string())?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err("Only http/https URLs are allowed.".to_string()),
    }

    if url.host_str().is_none() {
        return Err("Invalid URL.".to_string());
    }

    Ok(())
}

/// Checks whether `referrer` shares scheme, host and port with an HTTPS
/// origin built from the request `host`.
pub fn same_origin_referrer(referrer: &str, host: &str) -> bool {
    let Ok(origin) = Url::parse(&format!("https://{host}/")) else {
        return false;
    };
    let Ok(referrer) = Url::parse(referrer) else {
        return false;
    };

    origin.scheme() == referrer.scheme()
        && origin.host_str() == referrer.host_str()
        && origin.port_or_known_default() == referrer.port_or_known_default()
}
