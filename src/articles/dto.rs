use serde::Deserialize;

use crate::articles::repo_types::Article;

pub const TITLE_MAX: usize = 1000;

/// Article create/edit form body. An unchecked checkbox is simply absent.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ArticleForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub is_verified: Option<String>,
}

/// Validated article fields.
#[derive(Debug, PartialEq, Eq)]
pub struct ArticleInput {
    pub title: String,
    pub body: Option<String>,
    pub is_verified: bool,
}

impl ArticleForm {
    pub fn from_article(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            body: article.body.clone().unwrap_or_default(),
            is_verified: article.is_verified.then(|| "y".to_string()),
        }
    }

    pub fn checked(&self) -> bool {
        matches!(self.is_verified.as_deref(), Some(v) if v != "false" && v != "0")
    }

    pub fn validate(&self) -> Result<ArticleInput, Vec<String>> {
        // Whitespace only counts when deciding emptiness; values are stored as submitted.
        if self.title.trim().is_empty() {
            return Err(vec!["Title is required".to_string()]);
        }
        if self.title.chars().count() > TITLE_MAX {
            return Err(vec![format!(
                "Title must be at most {TITLE_MAX} characters"
            )]);
        }
        let body = (!self.body.is_empty()).then(|| self.body.clone());
        Ok(ArticleInput {
            title: self.title.clone(),
            body,
            is_verified: self.checked(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_submitted_values() {
        let form = ArticleForm {
            title: " Hello ".into(),
            body: "   ".into(),
            is_verified: Some("y".into()),
        };
        assert_eq!(
            form.validate().unwrap(),
            ArticleInput {
                title: " Hello ".into(),
                body: Some("   ".into()),
                is_verified: true,
            }
        );
    }

    #[test]
    fn empty_body_is_none() {
        let form = ArticleForm {
            title: "Hello".into(),
            ..Default::default()
        };
        let input = form.validate().unwrap();
        assert_eq!(input.body, None);
        assert!(!input.is_verified);
    }

    #[test]
    fn title_is_required() {
        let form = ArticleForm {
            title: "  ".into(),
            ..Default::default()
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn prefill_from_article() {
        let article = Article {
            id: 3,
            title: "T".into(),
            body: None,
            user_id: 1,
            is_verified: true,
        };
        let form = ArticleForm::from_article(&article);
        assert_eq!(form.body, "");
        assert!(form.checked());
    }
}
