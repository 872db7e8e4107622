use validator::ValidationError;

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Accepts http(s) URLs whose path ends in a known image extension,
/// matching case-insensitively.
pub fn validate_image_url(url: &str) -> Result<(), ValidationError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ValidationError::new("image_url")
            .with_message("image URL must start with http:// or https://".into()));
    }
    let lowered = url.to_ascii_lowercase();
    if !IMAGE_EXTENSIONS
        .iter()
        .any(|ext| lowered.ends_with(&format!(".{}", ext)))
    {
        return Err(ValidationError::new("image_url")
            .with_message("image URL must point to an image file".into()));
    }
    Ok(())
}
