//! Newline-delimited JSON protocol spoken over stdio
//!
//! One request per line:
//!
//! ```json
//! {"id": 1, "op": "getContactsByName", "args": ["William Grapeseed", ["note"]]}
//! ```
//!
//! One response per request, echoing `id`:
//!
//! ```json
//! {"id": 1, "ok": [{"firstName": "William", "lastName": "Grapeseed"}]}
//! {"id": 2, "error": {"kind": "InvalidArgument", "message": "name must be a string"}}
//! ```
//!
//! Change notifications are written unsolicited as
//! `{"event": "contact-changed", "payload": ..., "received_at": ...}`.
//!
//! Arguments are passed through untouched; an omitted argument and an
//! explicit `null` are different things to the validation layer.

use contacts_core::{AddressBook, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A decoded request line
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    /// Caller-chosen correlation id, echoed back verbatim
    #[serde(default)]
    pub id: Value,
    /// Operation name
    pub op: String,
    /// Positional arguments
    #[serde(default)]
    pub args: Vec<Value>,
}

/// A response line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Ok { id: Value, ok: Value },
    Err { id: Value, error: ErrorBody },
}

/// Error as reported on the wire
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
}

impl Response {
    fn from_result(id: Value, result: Result<Value>) -> Self {
        match result {
            Ok(ok) => Response::Ok { id, ok },
            Err(e) => Response::Err {
                id,
                error: ErrorBody {
                    kind: e.kind().as_str(),
                    message: e.to_string(),
                },
            },
        }
    }
}

/// Decode and execute one request line
///
/// A line that is not a valid request still produces a response (with a
/// `null` id) so the host never waits on a reply that will not come.
pub async fn handle_line(book: &AddressBook, line: &str) -> Response {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => handle(book, request).await,
        Err(e) => Response::from_result(
            Value::Null,
            Err(Error::invalid_argument(format!("malformed request: {}", e))),
        ),
    }
}

/// Execute one request against the address book
pub async fn handle(book: &AddressBook, request: Request) -> Response {
    let result = execute(book, &request.op, &request.args).await;
    Response::from_result(request.id, result)
}

async fn execute(book: &AddressBook, op: &str, args: &[Value]) -> Result<Value> {
    let contacts = book.dispatcher();
    let listener = book.listener();
    let required = |index: usize| args.get(index).unwrap_or(&Value::Null);

    match op {
        "getAuthStatus" => encode(contacts.authorization_status().await),
        "requestAccess" => encode(contacts.request_access().await),
        "getAllContacts" => encode(contacts.list_all(args.first()).await),
        "getContactsByName" => encode(contacts.find_by_name(required(0), args.get(1)).await),
        "addNewContact" => encode(contacts.create(required(0)).await),
        "updateContact" => encode(contacts.update(required(0)).await),
        "deleteContact" => encode(contacts.delete(required(0)).await),
        "listener.setup" => listener.setup().map(|()| Value::Bool(true)),
        "listener.remove" => listener.remove().map(|()| Value::Bool(true)),
        "listener.isListening" => Ok(Value::Bool(listener.is_listening())),
        other => Err(Error::invalid_argument(format!(
            "unknown operation: {}",
            other
        ))),
    }
}

fn encode<T: Serialize>(result: Result<T>) -> Result<Value> {
    Ok(serde_json::to_value(result?)?)
}
