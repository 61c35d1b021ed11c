//! CLI argument validators.

/// Largest accepted frame edge in pixels.
const MAX_DIMENSION: u32 = 8192;

/// Parse and validate a frame dimension (1-8192).
pub fn parse_dimension(s: &str) -> Result<u32, String> {
    let value: u32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid size"))?;

    if !(1..=MAX_DIMENSION).contains(&value) {
        return Err(format!(
            "size must be between 1 and {MAX_DIMENSION}, got {value}"
        ));
    }

    Ok(value)
}
