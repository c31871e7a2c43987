use clap::{Args, Parser, Subcommand, ValueEnum};
use mdstore::{Request, Store, StoreConfig, StoreError};
use std::io::Read;
use std::process;

/// mdstore CLI — manage the Markdown documents of a site's content directory
#[derive(Parser)]
#[command(name = "mdstore", version, about)]
struct Cli {
    /// Project root containing `content/` and `.tina/schema.json`
    #[arg(long, env = "MDSTORE_PROJECT_ROOT")]
    project_root: Option<String>,

    /// Output format for structured results
    #[arg(long, default_value = "yaml")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// List collections under the content root
    Collections,

    /// List documents in a collection
    List {
        /// Collection name
        collection: String,
        /// Include files in subdirectories
        #[arg(long)]
        recursive: bool,
    },

    /// Print the raw text of a document
    Read {
        /// Collection name
        collection: String,
        /// Document path relative to the collection
        path: String,
    },

    /// Create a new document
    Create {
        /// Collection name
        collection: String,
        /// File name inside the collection
        path: String,
        #[command(flatten)]
        content: ContentArgs,
    },

    /// Replace the content of an existing document
    Update {
        /// Collection name
        collection: String,
        /// File name inside the collection
        path: String,
        #[command(flatten)]
        content: ContentArgs,
    },

    /// Delete a document
    Delete {
        /// Collection name
        collection: String,
        /// File name inside the collection
        path: String,
    },

    /// Move a document within a collection
    Move {
        collection: String,
        old_path: String,
        new_path: String,
    },

    /// Copy a document within a collection
    Copy {
        collection: String,
        source_path: String,
        dest_path: String,
    },

    /// Show a document's front matter
    Meta {
        /// Collection name
        collection: String,
        /// Document path relative to the collection
        path: String,
    },

    /// Merge fields into a document's front matter
    SetMeta {
        /// Collection name
        collection: String,
        /// Document path relative to the collection
        path: String,
        /// JSON object of fields to set
        updates: Option<String>,
        /// Single field (e.g. --field draft=false); values are parsed as JSON when possible
        #[arg(long = "field", value_parser = parse_key_value)]
        fields: Vec<(String, String)>,
    },

    /// Print the raw schema descriptor
    Schema,

    /// Execute a JSON request envelope (from the argument or stdin)
    Call {
        /// e.g. '{"action":"read","collection":"posts","path":"hello.md"}'
        request: Option<String>,
    },
}

#[derive(Args)]
struct ContentArgs {
    /// Literal content
    #[arg(long, conflicts_with_all = ["content_file", "content_stdin"])]
    content: Option<String>,
    /// Read content from a file
    #[arg(long)]
    content_file: Option<String>,
    /// Read content from stdin
    #[arg(long, conflicts_with = "content_file")]
    content_stdin: bool,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("Invalid key=value pair: no '=' found in '{s}'"))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        // Machine-readable error on stderr: ERROR:<kind>:<message>
        match e.downcast_ref::<StoreError>() {
            Some(store_err) => eprintln!("ERROR:{}:{store_err}", store_err.kind()),
            None => eprintln!("ERROR:{e}"),
        }
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = StoreConfig::resolve(cli.project_root.as_deref())?;
    let store = Store::open(&config)?;
    log::debug!("Using project root {}", store.project_root().display());

    match cli.command {
        Command::Collections => {
            let names = store.list_collections()?;
            print_output(&serde_json::json!(names), &cli.format)?;
        }

        Command::List {
            collection,
            recursive,
        } => {
            let docs = store.list_documents(&collection, recursive)?;
            print_output(&serde_json::json!(docs), &cli.format)?;
        }

        Command::Read { collection, path } => {
            print!("{}", store.read(&collection, &path)?);
        }

        Command::Create {
            collection,
            path,
            content,
        } => {
            let content = read_content(content)?;
            let status = store.create(&collection, &path, &content)?;
            print_status(&status, &cli.format)?;
        }

        Command::Update {
            collection,
            path,
            content,
        } => {
            let content = read_content(content)?;
            let status = store.update(&collection, &path, &content)?;
            print_status(&status, &cli.format)?;
        }

        Command::Delete { collection, path } => {
            let status = store.delete(&collection, &path)?;
            print_status(&status, &cli.format)?;
        }

        Command::Move {
            collection,
            old_path,
            new_path,
        } => {
            let status = store.move_document(&collection, &old_path, &new_path)?;
            print_status(&status, &cli.format)?;
        }

        Command::Copy {
            collection,
            source_path,
            dest_path,
        } => {
            let status = store.copy(&collection, &source_path, &dest_path)?;
            print_status(&status, &cli.format)?;
        }

        Command::Meta { collection, path } => {
            let text = store.get_metadata_json(&collection, &path)?;
            let value: serde_json::Value = serde_json::from_str(&text)?;
            print_output(&value, &cli.format)?;
        }

        Command::SetMeta {
            collection,
            path,
            updates,
            fields,
        } => {
            let data = metadata_payload(updates.as_deref(), fields)?;
            let status = store.update_metadata(&collection, &path, &data)?;
            print_status(&status, &cli.format)?;
        }

        Command::Schema => {
            print!("{}", store.read_schema()?);
        }

        Command::Call { request } => {
            let text = match request {
                Some(text) => text,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let response = store.execute(Request::from_json(&text)?)?;
            print_output(&response.into_json(), &cli.format)?;
        }
    }

    Ok(())
}

fn print_output(
    value: &serde_json::Value,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
    }
    Ok(())
}

fn print_status(message: &str, format: &OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    print_output(
        &serde_json::json!({ "ok": true, "message": message }),
        format,
    )
}

/// Build the `set-meta` payload: the JSON object argument (if any) with
/// `--field` pairs layered on top.
fn metadata_payload(
    updates: Option<&str>,
    fields: Vec<(String, String)>,
) -> Result<serde_json::Value, StoreError> {
    let mut payload = match updates {
        Some(text) => match serde_json::from_str(text) {
            Ok(serde_json::Value::Object(map)) => map,
            Ok(_) => {
                return Err(StoreError::Validation(
                    "metadata updates must be a JSON object".into(),
                ))
            }
            Err(e) => {
                return Err(StoreError::Validation(format!(
                    "metadata updates are not valid JSON: {e}"
                )))
            }
        },
        None => serde_json::Map::new(),
    };
    for (key, raw) in fields {
        payload.insert(key, field_value(raw));
    }
    Ok(serde_json::Value::Object(payload))
}

/// `--field` values are JSON literals when they parse as one, plain strings otherwise.
fn field_value(raw: String) -> serde_json::Value {
    serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw))
}

fn read_content(args: ContentArgs) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(content) = args.content {
        Ok(content)
    } else if let Some(path) = args.content_file {
        let content = std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read content file '{path}': {e}"))?;
        Ok(content)
    } else if args.content_stdin {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        Ok(content)
    } else {
        Err(StoreError::Validation(
            "no content given (use --content, --content-file or --content-stdin)".into(),
        )
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("title=Hello = World").unwrap(),
            ("title".to_string(), "Hello = World".to_string())
        );
        assert!(parse_key_value("no-equals").is_err());
    }

    #[test]
    fn test_field_values_infer_json() {
        assert_eq!(field_value("false".into()), serde_json::json!(false));
        assert_eq!(field_value("3".into()), serde_json::json!(3));
        assert_eq!(field_value("[\"a\"]".into()), serde_json::json!(["a"]));
        assert_eq!(field_value("Hello".into()), serde_json::json!("Hello"));
    }

    #[test]
    fn test_metadata_payload_fields_override_object() {
        let payload = metadata_payload(
            Some(r#"{"title":"From JSON","draft":true}"#),
            vec![("draft".to_string(), "false".to_string())],
        )
        .unwrap();
        assert_eq!(
            payload,
            serde_json::json!({ "title": "From JSON", "draft": false })
        );
    }

    #[test]
    fn test_metadata_payload_rejects_non_object() {
        let err = metadata_payload(Some("[1, 2]"), vec![]).unwrap_err();
        assert_eq!(err.kind(), mdstore::ErrorKind::Validation);
        let err = metadata_payload(Some("{oops"), vec![]).unwrap_err();
        assert_eq!(err.kind(), mdstore::ErrorKind::Validation);
    }

    #[test]
    fn test_set_meta_args() {
        let cli = Cli::try_parse_from([
            "mdstore",
            "--project-root",
            "/srv/site",
            "set-meta",
            "posts",
            "a.md",
            "{\"title\":\"New\"}",
            "--field",
            "draft=true",
        ])
        .unwrap();
        match cli.command {
            Command::SetMeta {
                updates, fields, ..
            } => {
                assert_eq!(updates.as_deref(), Some("{\"title\":\"New\"}"));
                assert_eq!(fields, vec![("draft".to_string(), "true".to_string())]);
            }
            _ => panic!("expected set-meta"),
        }
    }
}
