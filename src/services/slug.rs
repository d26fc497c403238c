//! 슬러그 파생 규칙
//!
//! 제목에서 URL-safe 식별자를 만드는 결정적 변환입니다.
//! 규칙: 소문자화 → 구두점 제거 → 공백을 하이픈으로 → 하이픈 연속
//! 축약 → 양끝 하이픈 제거. 한글을 포함한 모든 문자/숫자는 유지되므로
//! 한국어 제목도 그대로 슬러그가 됩니다.

/// 제목 문자열에서 슬러그를 파생합니다.
///
/// 결정적이고 멱등합니다: 같은 입력은 언제나 같은 출력을 내고,
/// `slugify(slugify(x)) == slugify(x)`가 성립합니다.
///
/// # Examples
///
/// ```
/// use cms_admin_backend::services::slug::slugify;
///
/// assert_eq!(slugify("테스트 뉴스"), "테스트-뉴스");
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// ```
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_hyphen = true; // 선행 하이픈 방지

    for ch in title.to_lowercase().chars() {
        if ch.is_alphanumeric() {
            slug.push(ch);
            last_was_hyphen = false;
        } else if (ch.is_whitespace() || ch == '-' || ch == '_') && !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
        // 그 외 구두점은 제거
    }

    if slug.ends_with('-') {
        slug.pop();
    }

    slug
}

/// 순번을 붙여 중복 슬러그를 구분합니다 (`base-2`, `base-3`, ...).
pub fn with_suffix(base: &str, n: u32) -> String {
    format!("{}-{}", base, n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_korean_title() {
        assert_eq!(slugify("테스트 뉴스"), "테스트-뉴스");
        assert_eq!(slugify("2024 지속가능경영 보고서 발간"), "2024-지속가능경영-보고서-발간");
    }

    #[test]
    fn test_punctuation_stripped() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("신제품 출시: '알파' 시리즈"), "신제품-출시-알파-시리즈");
    }

    #[test]
    fn test_lowercased() {
        assert_eq!(slugify("Annual ESG Report"), "annual-esg-report");
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        assert_eq!(slugify("a   b\t c"), "a-b-c");
        assert_eq!(slugify("  양끝 공백  "), "양끝-공백");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "테스트 뉴스",
            "Hello, World!",
            "  mixed 한글 English 123  ",
            "---",
            "",
        ];

        for input in inputs {
            let once = slugify(input);
            assert_eq!(slugify(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn test_deterministic() {
        for _ in 0..3 {
            assert_eq!(slugify("같은 입력"), "같은-입력");
        }
    }

    #[test]
    fn test_suffix() {
        assert_eq!(with_suffix("테스트-뉴스", 2), "테스트-뉴스-2");
    }
}
