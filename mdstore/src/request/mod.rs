// Transport-neutral request envelope for the remote-callable operations

use crate::error::{Result, StoreError};
use crate::store::Store;
use serde::{Deserialize, Serialize};

/// One named action with its arguments, as a host receives it.
///
/// Serialized with an `action` tag, e.g.
/// `{"action": "read", "collection": "posts", "path": "hello.md"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Request {
    ListCollections,
    ListDocuments {
        collection: String,
        #[serde(default)]
        recursive: bool,
    },
    Read {
        collection: String,
        path: String,
    },
    Create {
        collection: String,
        path: String,
        content: String,
    },
    Update {
        collection: String,
        path: String,
        content: String,
    },
    Delete {
        collection: String,
        path: String,
    },
    Move {
        collection: String,
        old_path: String,
        new_path: String,
    },
    Copy {
        collection: String,
        source_path: String,
        dest_path: String,
    },
    GetMetadata {
        collection: String,
        path: String,
    },
    /// `updates` is either a JSON object or a string holding JSON text.
    UpdateMetadata {
        collection: String,
        path: String,
        updates: serde_json::Value,
    },
    ReadSchema,
}

impl Request {
    /// Decode a request envelope from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| StoreError::Validation(format!("malformed request: {e}")))
    }

    pub fn action(&self) -> &'static str {
        match self {
            Request::ListCollections => "list_collections",
            Request::ListDocuments { .. } => "list_documents",
            Request::Read { .. } => "read",
            Request::Create { .. } => "create",
            Request::Update { .. } => "update",
            Request::Delete { .. } => "delete",
            Request::Move { .. } => "move",
            Request::Copy { .. } => "copy",
            Request::GetMetadata { .. } => "get_metadata",
            Request::UpdateMetadata { .. } => "update_metadata",
            Request::ReadSchema => "read_schema",
        }
    }
}

/// Success payload of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    List(Vec<String>),
    Text(String),
    Status(String),
}

impl Response {
    pub fn into_json(self) -> serde_json::Value {
        match self {
            Response::List(items) => serde_json::json!(items),
            Response::Text(text) => serde_json::Value::String(text),
            Response::Status(message) => serde_json::json!({ "ok": true, "message": message }),
        }
    }
}

impl Store {
    /// Route a request to the matching store operation.
    pub fn execute(&self, request: Request) -> Result<Response> {
        log::debug!("Executing {}", request.action());
        let response = match request {
            Request::ListCollections => Response::List(self.list_collections()?),
            Request::ListDocuments {
                collection,
                recursive,
            } => Response::List(self.list_documents(&collection, recursive)?),
            Request::Read { collection, path } => Response::Text(self.read(&collection, &path)?),
            Request::Create {
                collection,
                path,
                content,
            } => Response::Status(self.create(&collection, &path, &content)?),
            Request::Update {
                collection,
                path,
                content,
            } => Response::Status(self.update(&collection, &path, &content)?),
            Request::Delete { collection, path } => {
                Response::Status(self.delete(&collection, &path)?)
            }
            Request::Move {
                collection,
                old_path,
                new_path,
            } => Response::Status(self.move_document(&collection, &old_path, &new_path)?),
            Request::Copy {
                collection,
                source_path,
                dest_path,
            } => Response::Status(self.copy(&collection, &source_path, &dest_path)?),
            Request::GetMetadata { collection, path } => {
                Response::Text(self.get_metadata_json(&collection, &path)?)
            }
            Request::UpdateMetadata {
                collection,
                path,
                updates,
            } => Response::Status(match &updates {
                serde_json::Value::String(text) => {
                    self.update_metadata_json(&collection, &path, text)?
                }
                other => self.update_metadata(&collection, &path, other)?,
            }),
            Request::ReadSchema => Response::Text(self.read_schema()?),
        };
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Store) {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("content/posts")).unwrap();
        let store = Store::open(&StoreConfig::new(tmp.path())).unwrap();
        (tmp, store)
    }

    #[test]
    fn test_decode_envelopes() {
        let req = Request::from_json(r#"{"action":"list_documents","collection":"posts"}"#).unwrap();
        assert_eq!(
            req,
            Request::ListDocuments {
                collection: "posts".into(),
                recursive: false
            }
        );

        let req = Request::from_json(r#"{"action":"read_schema"}"#).unwrap();
        assert_eq!(req.action(), "read_schema");
    }

    #[test]
    fn test_malformed_envelope() {
        let err = Request::from_json(r#"{"action":"explode"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = Request::from_json(r#"{"action":"read","collection":"posts"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_round_trip_through_dispatch() {
        let (_tmp, store) = setup();

        let status = store
            .execute(Request::Create {
                collection: "posts".into(),
                path: "a.md".into(),
                content: "---\ntitle: Old\n---\nBody\n".into(),
            })
            .unwrap();
        assert_eq!(status, Response::Status("Created posts/a.md".into()));

        store
            .execute(Request::UpdateMetadata {
                collection: "posts".into(),
                path: "a.md".into(),
                updates: json!("{\"title\": \"New\"}"),
            })
            .unwrap();

        let meta = store
            .execute(Request::GetMetadata {
                collection: "posts".into(),
                path: "a.md".into(),
            })
            .unwrap();
        match meta {
            Response::Text(text) => {
                let value: serde_json::Value = serde_json::from_str(&text).unwrap();
                assert_eq!(value, json!({ "title": "New" }));
            }
            other => panic!("unexpected response {other:?}"),
        }

        let listed = store.execute(Request::ListCollections).unwrap();
        assert_eq!(listed.into_json(), json!(["posts"]));
    }

    #[test]
    fn test_errors_pass_through() {
        let (_tmp, store) = setup();
        let err = store
            .execute(Request::Delete {
                collection: "posts".into(),
                path: "missing.md".into(),
            })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_status_json_shape() {
        let json = Response::Status("Deleted posts/a.md".into()).into_json();
        assert_eq!(json, json!({ "ok": true, "message": "Deleted posts/a.md" }));
    }
}
