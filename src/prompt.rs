/// Ordered Korean -> English keyword substitutions applied before wrapping.
/// Order matters: earlier replacements win on overlapping text.
const KEYWORD_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("캐주얼", "casual"),
    ("포멀", "formal"),
    ("스포츠", "sporty"),
    ("스트릿", "street"),
    ("상의", "top"),
    ("하의", "bottom"),
    ("아우터", "outerwear"),
    ("원피스", "dress"),
    ("봄", "spring"),
    ("여름", "summer"),
    ("가을", "autumn"),
    ("겨울", "winter"),
    ("면", "cotton"),
    ("니트", "knit"),
    ("데님", "denim"),
    ("스트라이프", "striped"),
    ("체크", "checked"),
    ("도트", "polka dot"),
    ("플레인", "plain"),
];

pub const PROMPT_PREFIX: &str = "A stylish and well-coordinated outfit: ";
pub const PROMPT_SUFFIX: &str = ". High quality fashion photography, clean background, \
professional lighting, full body shot, modern and trendy style, detailed clothing textures, \
realistic proportions, vibrant colors, fashion magazine quality.";

/// Builds the image-generation prompt from a Korean outfit description.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptComposer;

impl PromptComposer {
    #[must_use]
    pub fn to_english_prompt(&self, korean_text: &str) -> String {
        let english = KEYWORD_SUBSTITUTIONS
            .iter()
            .fold(korean_text.to_string(), |text, (ko, en)| text.replace(ko, en));
        self.wrap(&english)
    }

    #[must_use]
    pub fn wrap(&self, outfit_text: &str) -> String {
        let prompt = format!("{PROMPT_PREFIX}{outfit_text}{PROMPT_SUFFIX}");
        tracing::debug!(%prompt, "built image prompt");
        prompt
    }
}
