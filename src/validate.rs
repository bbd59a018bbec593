use crate::client::{JsonRequest, Params, RequestMode};
use crate::error::Result;
use crate::reply::Reply;
use crate::types::ExistsReply;

const USER_EXISTS_ENDPOINT: &str = "/api/user/exists";
const PAGE_EXISTS_ENDPOINT: &str = "/api/page/exists";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValidity {
    Valid,
    Invalid(String),
}

/// Result of an asynchronous field check: either a validity for the field
/// or a server failure to alert the user about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Field(FieldValidity),
    Alert(String),
}

async fn exists(
    requester: &dyn JsonRequest,
    endpoint: &str,
    key: &str,
    value: &str,
) -> Result<Reply<ExistsReply>> {
    let params = Params::new().with(key, value);
    let value = requester.request(endpoint, params, RequestMode::Read).await?;
    Reply::from_status(value)
}

fn invalid_if(condition: bool, message: &str) -> Validation {
    if condition {
        Validation::Field(FieldValidity::Invalid(message.to_string()))
    } else {
        Validation::Field(FieldValidity::Valid)
    }
}

/// Check a username. With `expect_existing` the account must exist
/// (lookups); otherwise the name must still be free (registration).
pub async fn check_username(
    requester: &dyn JsonRequest,
    username: &str,
    expect_existing: bool,
) -> Result<Validation> {
    Ok(match exists(requester, USER_EXISTS_ENDPOINT, "username", username).await? {
        Reply::Ok(ExistsReply { exists }) if expect_existing => {
            invalid_if(!exists, "That username does not exist")
        }
        Reply::Ok(ExistsReply { exists }) => invalid_if(exists, "That username is already taken!"),
        Reply::Failure { message } => Validation::Alert(message),
    })
}

pub async fn check_email(
    requester: &dyn JsonRequest,
    email: &str,
    expect_existing: bool,
) -> Result<Validation> {
    Ok(match exists(requester, USER_EXISTS_ENDPOINT, "email", email).await? {
        Reply::Ok(ExistsReply { exists }) if expect_existing => {
            invalid_if(!exists, "That email address does not exist")
        }
        Reply::Ok(ExistsReply { exists }) => {
            invalid_if(exists, "That email address is already taken")
        }
        Reply::Failure { message } => Validation::Alert(message),
    })
}

/// Check a page path. With `expect_existing` the page must already exist
/// (editing, deleting); otherwise the path must still be free (creating).
pub async fn check_path(
    requester: &dyn JsonRequest,
    path: &str,
    expect_existing: bool,
) -> Result<Validation> {
    Ok(match exists(requester, PAGE_EXISTS_ENDPOINT, "path", path).await? {
        Reply::Ok(ExistsReply { exists }) if expect_existing => {
            invalid_if(!exists, "That path could not be found")
        }
        Reply::Ok(ExistsReply { exists }) => invalid_if(exists, "That path is already being used"),
        Reply::Failure { message } => Validation::Alert(message),
    })
}
