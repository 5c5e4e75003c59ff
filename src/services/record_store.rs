//! 记录存储服务 - 业务能力层
//!
//! 每道题目对应 `<questions_dir>/q0007.json` 这样的一个文件，
//! 多次运行（不同语言）不断向同一份记录合并内容。

use std::io;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::{debug, warn};

use crate::error::{ExtractError, ExtractResult};
use crate::models::{ImageRef, Language, Record, Translation};
use crate::utils::write_atomically;

/// 记录存储
///
/// 职责：
/// - 读取或新建单道题目的记录
/// - 合并某一语言的内容（纯函数）
/// - 原子写入（临时文件 + rename）
pub struct RecordStore {
    dir: PathBuf,
}

impl RecordStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 记录文件路径，如 `q0007.json`
    pub fn path_for(&self, id: u32) -> PathBuf {
        self.dir.join(format!("q{:04}.json", id))
    }

    /// 读取已有记录；文件不存在或已损坏时返回空记录
    pub async fn load_or_create(&self, id: u32) -> Record {
        let path = self.path_for(id);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Record::skeleton(id),
            Err(e) => {
                warn!("⚠️  读取记录失败 {}: {}，使用新记录", path.display(), e);
                return Record::skeleton(id);
            }
        };

        match serde_json::from_str::<Record>(&content) {
            Ok(record) if record.id() == id => record,
            Ok(record) => {
                warn!(
                    "⚠️  记录 {} 的编号为 {}，与文件名不符，使用新记录",
                    path.display(),
                    record.id()
                );
                Record::skeleton(id)
            }
            Err(e) => {
                warn!("⚠️  记录文件已损坏 {}: {}，使用新记录", path.display(), e);
                Record::skeleton(id)
            }
        }
    }

    /// 合并某一语言的内容
    ///
    /// - 只替换 `language` 对应的条目，其他语言原样保留
    /// - 图片先写入者优先：仅当记录仍是默认图片且新图片不是默认图片时才更新
    pub fn merge(mut record: Record, language: Language, translation: Translation, image: &ImageRef) -> Record {
        record.translations.insert(language.code().to_string(), translation);
        if record.image.is_default() && !image.is_default() {
            record.image = image.clone();
        }
        record
    }

    /// 序列化为 4 空格缩进的 JSON
    pub fn to_bytes(record: &Record) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        record
            .serialize(&mut serializer)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(buf)
    }

    /// 写入临时文件并 fsync，再 rename 到目标路径
    ///
    /// 失败时删除临时文件，已有的记录文件不受影响。
    pub async fn persist(&self, record: &Record) -> ExtractResult<PathBuf> {
        let path = self.path_for(record.id());
        let tmp_path = path.with_extension("json.tmp");

        let bytes = Self::to_bytes(record).map_err(|e| ExtractError::io_failure(path.display().to_string(), e))?;
        write_atomically(&path, &tmp_path, &bytes).await?;
        debug!("💾 已写入 {} ({} 字节)", path.display(), bytes.len());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::models::ExtractionResult;

    fn translation(text: &str) -> Translation {
        Translation::from_extraction(&ExtractionResult {
            text: text.to_string(),
            options: vec!["Вариант А".to_string(), "Вариант Б".to_string()],
            correct_index: 2,
            ..Default::default()
        })
    }

    #[test]
    fn test_path_is_zero_padded() {
        let store = RecordStore::new("out");
        assert_eq!(store.path_for(7), Path::new("out").join("q0007.json"));
        assert_eq!(store.path_for(12345), Path::new("out").join("q12345.json"));
    }

    #[test]
    fn test_merge_keeps_other_languages() {
        let record = Record::skeleton(3);
        let record = RecordStore::merge(record, Language::Uz, translation("Savol matni?"), &ImageRef::Default);
        let record = RecordStore::merge(record, Language::Ru, translation("Текст вопроса?"), &ImageRef::Default);

        assert_eq!(record.translations.len(), 2);
        assert_eq!(record.translations["uz"].text, "Savol matni?");
        assert_eq!(record.translations["ru"].text, "Текст вопроса?");
    }

    #[test]
    fn test_merge_image_first_write_wins() {
        let first = ImageRef::Path("data/images/ticket_1_q3.webp".to_string());
        let second = ImageRef::Path("data/images/ticket_1_q3.png".to_string());

        let record = RecordStore::merge(Record::skeleton(3), Language::Uz, translation("a"), &first);
        let record = RecordStore::merge(record, Language::Ru, translation("b"), &second);
        let record = RecordStore::merge(record, Language::Uzk, translation("c"), &ImageRef::Default);

        assert_eq!(record.image, first);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let image = ImageRef::Path("data/images/ticket_1_q3.webp".to_string());
        let once = RecordStore::merge(Record::skeleton(3), Language::Ru, translation("x"), &image);
        let twice = RecordStore::merge(once.clone(), Language::Ru, translation("x"), &image);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_to_bytes_uses_four_space_indent() {
        let bytes = RecordStore::to_bytes(&Record::skeleton(1)).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\n    \"id\": 1"));
    }

    #[tokio::test]
    async fn test_persist_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());

        let record = RecordStore::merge(Record::skeleton(7), Language::Ru, translation("Вопрос?"), &ImageRef::Default);
        let path = store.persist(&record).await.unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(store.load_or_create(7).await, record);
    }

    #[test]
    fn test_corrupt_file_replaced_by_skeleton() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        std::fs::write(store.path_for(5), "{ not json").unwrap();

        let record = tokio_test::block_on(store.load_or_create(5));
        assert_eq!(record, Record::skeleton(5));

        // 损坏的文件在下一次写入时被覆盖
        let path = tokio_test::assert_ok!(tokio_test::block_on(store.persist(&record)));
        assert!(std::fs::read_to_string(path).unwrap().contains("\"id\": 5"));
    }

    #[tokio::test]
    async fn test_legacy_question_id_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        std::fs::write(
            store.path_for(9),
            r#"{"questionId": 9, "image": "data/images/ticket_1_q9.webp", "translations": {}}"#,
        )
        .unwrap();

        let record = store.load_or_create(9).await;
        assert_eq!(record.id(), 9);
        assert_eq!(record.image.as_str(), "data/images/ticket_1_q9.webp");
    }

    #[tokio::test]
    async fn test_failed_persist_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        let first = RecordStore::merge(Record::skeleton(4), Language::Ru, translation("Первый"), &ImageRef::Default);
        let path = store.persist(&first).await.unwrap();
        let before = std::fs::read(&path).unwrap();

        // 临时文件位置被目录占用，写入失败
        let tmp_path = path.with_extension("json.tmp");
        std::fs::create_dir(&tmp_path).unwrap();
        let second = RecordStore::merge(first, Language::Uz, translation("Ikkinchi"), &ImageRef::Default);
        let err = store.persist(&second).await.unwrap_err();

        assert!(matches!(err, ExtractError::IoFailure { .. }));
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }
}
