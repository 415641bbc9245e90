use crate::error::{AppResult, TemplateError};
use std::fs;
use std::path::Path;

/// 加载参数模板，去掉空白行，保留原有顺序
pub fn load_template(template_path: &Path) -> AppResult<Vec<String>> {
    if !template_path.is_file() {
        return Err(TemplateError::TemplateMissing {
            path: template_path.to_path_buf(),
        }
        .into());
    }

    let content = fs::read_to_string(template_path).map_err(|source| TemplateError::ReadFailed {
        path: template_path.to_path_buf(),
        source,
    })?;

    let fragments: Vec<String> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect();

    if fragments.is_empty() {
        return Err(TemplateError::TemplateEmpty {
            path: template_path.to_path_buf(),
        }
        .into());
    }

    tracing::debug!("已加载 {} 个参数片段: {}", fragments.len(), template_path.display());
    Ok(fragments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_load_template_filters_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Arguments.template");
        fs::write(&path, "-p [PlateVar]\n\n   \n-b [Hbarcode]\r\n-n *\n").unwrap();

        let fragments = load_template(&path).unwrap();
        assert_eq!(fragments, vec!["-p [PlateVar]", "-b [Hbarcode]", "-n *"]);
    }

    #[test]
    fn test_load_template_missing_and_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Arguments.template");

        let err = load_template(&path).unwrap_err();
        assert!(matches!(err, AppError::Template(TemplateError::TemplateMissing { .. })));

        fs::write(&path, "\n  \n\t\n").unwrap();
        let err = load_template(&path).unwrap_err();
        assert!(matches!(err, AppError::Template(TemplateError::TemplateEmpty { .. })));
    }
}
