//! Prompt helpers for garment generation

/// Wrap a garment description in the fashion-photography prompt template
pub fn create_english_prompt(subject: &str) -> String {
    format!(
        "A detailed high-quality fashion photography of {}, professional studio lighting, \
         fashion magazine style, elegant, 4k, high resolution, detailed texture",
        subject.trim()
    )
}
