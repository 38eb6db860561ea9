use crate::error::Result;
use std::path::Path;
use teavision_common::ReportTable;

/// 表をCSVファイルに書き出す
pub fn write_csv(table: &ReportTable, output_path: &Path) -> Result<()> {
    let content = table.to_csv()?;
    std::fs::write(output_path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut table = ReportTable::new("t", &["Image Name", "Prediction"]);
        table.push_row(vec!["a.jpg".into(), "Central".into()]);
        write_csv(&table, &path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Image Name,Prediction\na.jpg,Central\n"
        );
    }
}
