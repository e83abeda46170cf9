//! Reading and writing collection archive files.

use crate::{CollectionFilePath, Error, Result};
use bson::{Bson, Document};
use serde_json::Value;
use std::{fmt::Display, str::FromStr};
use tokio::fs;

/// The Extended JSON flavour documents are written in.
///
/// Either flavour is accepted when reading.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum JsonFormat {
    /// Human readable; numbers become plain JSON numbers, so an int64 that fits in 32 bits
    /// reads back as an int32.
    Relaxed,
    /// Every BSON type is spelled out, so int32/int64/double survive a round trip.
    #[default]
    Canonical,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("{0} is not a valid JSON format, values are relaxed and canonical")]
pub struct ParseJsonFormatError(String);

impl FromStr for JsonFormat {
    type Err = ParseJsonFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "relaxed" => Ok(Self::Relaxed),
            "canonical" => Ok(Self::Canonical),
            _ => Err(ParseJsonFormatError(s.into())),
        }
    }
}

impl Display for JsonFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Relaxed => write!(f, "relaxed"),
            Self::Canonical => write!(f, "canonical"),
        }
    }
}

/// Serialize documents as an indented JSON array.
pub fn encode_documents(
    documents: Vec<Document>,
    format: JsonFormat,
) -> Result<Vec<u8>, serde_json::Error> {
    let values = documents
        .into_iter()
        .map(|doc| match format {
            JsonFormat::Relaxed => Bson::Document(doc).into_relaxed_extjson(),
            JsonFormat::Canonical => Bson::Document(doc).into_canonical_extjson(),
        })
        .collect();
    serde_json::to_vec_pretty(&Value::Array(values))
}

/// Parse an archive file's contents back into documents. `path` is only used for error context.
pub fn decode_documents(path: &CollectionFilePath, bytes: &[u8]) -> Result<Vec<Document>> {
    let value: Value = serde_json::from_slice(bytes).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let Value::Array(values) = value else {
        return Err(Error::NotAnArray {
            path: path.to_path_buf(),
        });
    };

    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            if !value.is_object() {
                return Err(Error::NotADocument {
                    path: path.to_path_buf(),
                    index,
                });
            }
            match Bson::try_from(value) {
                Ok(Bson::Document(doc)) => Ok(doc),
                // an object can still decode to a scalar, e.g. `{"$oid": ...}`
                Ok(_) => Err(Error::NotADocument {
                    path: path.to_path_buf(),
                    index,
                }),
                Err(source) => Err(Error::ExtendedJson {
                    path: path.to_path_buf(),
                    index,
                    source,
                }),
            }
        })
        .collect()
}

/// Write `documents` to `path`, replacing any existing file. Returns the number of documents
/// written.
pub async fn write_collection_file(
    path: &CollectionFilePath,
    documents: Vec<Document>,
    format: JsonFormat,
) -> Result<usize> {
    let count = documents.len();
    let bytes = encode_documents(documents, format).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, bytes)
        .await
        .map_err(|source| Error::WriteFile {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(count)
}

pub async fn read_collection_file(path: &CollectionFilePath) -> Result<Vec<Document>> {
    let bytes = fs::read(path).await.map_err(|source| Error::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    decode_documents(path, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArchiveRoot, InstanceName};
    use bson::{doc, oid::ObjectId, DateTime};
    use pretty_assertions::assert_eq;

    fn collection_file(root: &std::path::Path) -> CollectionFilePath {
        ArchiveRoot::new(root)
            .instance(&InstanceName::derive(
                "",
                clusterdump_time::Time::from_timestamp_millis(0).unwrap(),
            ))
            .database("db")
            .collection_file("coll")
    }

    #[test]
    fn empty_collection_is_empty_array() {
        assert_eq!(encode_documents(vec![], JsonFormat::Relaxed).unwrap(), b"[]");
        assert_eq!(encode_documents(vec![], JsonFormat::Canonical).unwrap(), b"[]");
    }

    #[test]
    fn relaxed_output_is_indented() {
        let id = ObjectId::parse_str("65a1b2c3d4e5f60718293a4b").unwrap();
        let out = encode_documents(
            vec![doc! { "_id": id, "name": "ada", "age": 36 }],
            JsonFormat::Relaxed,
        )
        .unwrap();
        let expected = r#"[
  {
    "_id": {
      "$oid": "65a1b2c3d4e5f60718293a4b"
    },
    "name": "ada",
    "age": 36
  }
]"#;
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn canonical_keeps_numeric_types() {
        let original = vec![doc! { "_id": 1_i64, "small": 2_i32, "ratio": 0.5 }];
        let path = collection_file(std::path::Path::new("unused"));
        let bytes = encode_documents(original.clone(), JsonFormat::Canonical).unwrap();
        let decoded = decode_documents(&path, &bytes).unwrap();
        assert_eq!(decoded, original);
        assert_eq!(decoded[0].get("_id"), Some(&Bson::Int64(1)));
    }

    #[test]
    fn relaxed_narrows_small_int64() {
        let path = collection_file(std::path::Path::new("unused"));
        let original = vec![doc! { "_id": 1, "count": 5_i64 }];

        let bytes = encode_documents(original.clone(), JsonFormat::default()).unwrap();
        let decoded = decode_documents(&path, &bytes).unwrap();
        assert_eq!(decoded[0].get("count"), Some(&Bson::Int64(5)));

        let bytes = encode_documents(original, JsonFormat::Relaxed).unwrap();
        let decoded = decode_documents(&path, &bytes).unwrap();
        assert_eq!(decoded[0].get("count"), Some(&Bson::Int32(5)));
    }

    #[test]
    fn relaxed_round_trips_common_types() {
        let original = vec![
            doc! {
                "_id": ObjectId::parse_str("65a1b2c3d4e5f60718293a4b").unwrap(),
                "name": "ada",
                "tags": ["a", "b"],
                "nested": { "flag": true, "missing": Bson::Null },
                "created": DateTime::from_millis(1_704_164_645_678),
                "count": 7_i32,
            },
            doc! { "_id": "string-id" },
        ];
        let path = collection_file(std::path::Path::new("unused"));
        let bytes = encode_documents(original.clone(), JsonFormat::Relaxed).unwrap();
        assert_eq!(decode_documents(&path, &bytes).unwrap(), original);
    }

    #[test]
    fn decode_rejects_non_arrays_and_non_documents() {
        let path = collection_file(std::path::Path::new("unused"));

        let err = decode_documents(&path, br#"{"_id": 1}"#).unwrap_err();
        assert!(matches!(err, Error::NotAnArray { .. }), "{err}");

        let err = decode_documents(&path, br#"[{"_id": 1}, 2]"#).unwrap_err();
        assert!(matches!(err, Error::NotADocument { index: 1, .. }), "{err}");

        let err = decode_documents(&path, br#"[{"$oid": "65a1b2c3d4e5f60718293a4b"}]"#).unwrap_err();
        assert!(matches!(err, Error::NotADocument { index: 0, .. }), "{err}");

        let err = decode_documents(&path, b"[{").unwrap_err();
        assert!(matches!(err, Error::Json { .. }), "{err}");
    }

    #[tokio::test]
    async fn write_then_read() {
        let tmp = tempfile::tempdir().unwrap();
        let path = collection_file(tmp.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();

        let documents = vec![doc! { "_id": 1, "v": "x" }, doc! { "_id": 2, "v": "y" }];
        let written = write_collection_file(&path, documents.clone(), JsonFormat::Relaxed)
            .await
            .unwrap();
        assert_eq!(written, 2);
        assert_eq!(read_collection_file(&path).await.unwrap(), documents);

        write_collection_file(&path, vec![], JsonFormat::Relaxed)
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(&*path).unwrap(), "[]");
        assert!(read_collection_file(&path).await.unwrap().is_empty());
    }

    #[test]
    fn parse_format() {
        assert_eq!("relaxed".parse::<JsonFormat>(), Ok(JsonFormat::Relaxed));
        assert_eq!("canonical".parse::<JsonFormat>(), Ok(JsonFormat::Canonical));
        assert_eq!(
            "shell".parse::<JsonFormat>().unwrap_err().to_string(),
            "shell is not a valid JSON format, values are relaxed and canonical"
        );
        assert_eq!(JsonFormat::default().to_string(), "canonical");
    }
}
