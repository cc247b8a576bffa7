use std::collections::HashMap;

/// English fashion vocabulary -> Korean display terms.
const FASHION_TERMS: &[(&str, &str)] = &[
    // styles
    ("casual", "캐주얼"),
    ("formal", "정장"),
    ("sporty", "스포티"),
    ("street", "스트릿"),
    ("minimal", "미니멀"),
    ("vintage", "빈티지"),
    ("classic", "클래식"),
    ("trendy", "트렌디"),
    ("elegant", "엘레강트"),
    ("bohemian", "보헤미안"),
    // colors
    ("black", "블랙"),
    ("white", "화이트"),
    ("gray", "그레이"),
    ("grey", "그레이"),
    ("navy", "네이비"),
    ("beige", "베이지"),
    ("brown", "브라운"),
    ("khaki", "카키"),
    ("olive", "올리브"),
    ("burgundy", "버건디"),
    ("maroon", "마룬"),
    ("red", "레드"),
    ("blue", "블루"),
    ("green", "그린"),
    ("yellow", "옐로우"),
    ("pink", "핑크"),
    ("purple", "퍼플"),
    ("orange", "오렌지"),
    // clothing types
    ("jacket", "재킷"),
    ("coat", "코트"),
    ("blazer", "블레이저"),
    ("cardigan", "가디건"),
    ("sweater", "스웨터"),
    ("hoodie", "후드"),
    ("shirt", "셔츠"),
    ("t-shirt", "티셔츠"),
    ("pants", "팬츠"),
    ("jeans", "청바지"),
    ("dress", "드레스"),
    ("skirt", "스커트"),
    ("shorts", "반바지"),
    ("fleece", "플리스"),
    ("fleece jacket", "플리스 재킷"),
    // patterns
    ("solid", "솔리드"),
    ("striped", "스트라이프"),
    ("checked", "체크"),
    ("polka dot", "도트"),
    ("floral", "플로럴"),
    ("geometric", "지오메트릭"),
];

/// Read-only English -> Korean lookup built once at startup and shared by
/// reference. Unknown terms pass through untouched.
#[derive(Debug, Clone)]
pub struct TermTranslator {
    table: HashMap<&'static str, &'static str>,
}

impl Default for TermTranslator {
    fn default() -> Self {
        Self::from_pairs(FASHION_TERMS)
    }
}

impl TermTranslator {
    #[must_use]
    pub fn from_pairs(pairs: &[(&'static str, &'static str)]) -> Self {
        Self {
            table: pairs.iter().copied().collect(),
        }
    }

    /// Returns the Korean term for `term`, or `term` itself when unmapped.
    #[must_use]
    pub fn translate(&self, term: &str) -> String {
        let key = term.trim().to_lowercase();
        self.table
            .get(key.as_str())
            .map_or_else(|| term.to_string(), |ko| (*ko).to_string())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_terms_case_and_whitespace_insensitively() {
        let t = TermTranslator::default();
        assert_eq!(t.translate("casual"), "캐주얼");
        assert_eq!(t.translate("  Black "), "블랙");
        assert_eq!(t.translate("Fleece Jacket"), "플리스 재킷");
        assert_eq!(t.translate("grey"), t.translate("gray"));
    }

    #[test]
    fn unknown_terms_are_returned_unchanged() {
        let t = TermTranslator::default();
        assert_eq!(t.translate("xyz123"), "xyz123");
        // original string, not the normalized key
        assert_eq!(t.translate(" Denim "), " Denim ");
        assert_eq!(t.translate("플레인"), "플레인");
        assert_eq!(t.translate(""), "");
    }

    #[test]
    fn default_table_covers_the_whole_vocabulary() {
        let t = TermTranslator::default();
        assert_eq!(t.len(), FASHION_TERMS.len());
        assert!(!t.is_empty());
    }

    #[test]
    fn custom_tables_replace_the_default_vocabulary() {
        let t = TermTranslator::from_pairs(&[("linen", "린넨")]);
        assert_eq!(t.translate("LINEN"), "린넨");
        assert_eq!(t.translate("casual"), "casual");
    }
}
