// Display URL for a tour's cover image

pub const DEFAULT_IMAGE_PATH: &str = "/assets/images/hero_background-min.jpg";

#[derive(Debug, Clone)]
pub struct ImageResolver {
    default_path: String,
}

impl Default for ImageResolver {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_PATH)
    }
}

impl ImageResolver {
    pub fn new(default_path: impl Into<String>) -> Self {
        Self {
            default_path: default_path.into(),
        }
    }

    // Purely syntactic: makes the path root-relative, never checks that it exists
    pub fn resolve(&self, image_url: Option<&str>) -> String {
        match image_url.filter(|url| !url.is_empty()) {
            Some(url) if url.starts_with('/') => url.to_string(),
            Some(url) => format!("/{}", url),
            None => self.default_path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(None, DEFAULT_IMAGE_PATH; "#1 Missing uses default")]
    #[test_case(Some(""), DEFAULT_IMAGE_PATH; "#2 Empty uses default")]
    #[test_case(Some("images/x.jpg"), "/images/x.jpg"; "#3 Relative gets prefixed")]
    #[test_case(Some("/images/x.jpg"), "/images/x.jpg"; "#4 Root-relative unchanged")]
    fn test_resolve(input: Option<&str>, expected: &str) {
        assert_eq!(ImageResolver::default().resolve(input), expected);
    }

    #[test]
    fn test_custom_default() {
        let resolver = ImageResolver::new("/static/placeholder.webp");
        assert_eq!(resolver.resolve(None), "/static/placeholder.webp");
    }
}
