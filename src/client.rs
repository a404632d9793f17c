//! This module provides a client to connect to the to-do server
//!
//! [`Client`] handles the unauthenticated part (login and registration).
//! Once logged in, [`Client::with_session`] gives a [`RemoteTasks`], that implements [`TaskApi`].

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{TodoError, TodoResult, LOGIN};
use crate::session::{Session, UserProfile};
use crate::task::{NewTask, Task, TaskId, TaskUpdate};
use crate::traits::TaskApi;

const REGISTER: &str = "register";
const LOAD: &str = "load the tasks";
const CREATE: &str = "create the task";
const UPDATE: &str = "update the task";
const TOGGLE: &str = "toggle the task";
const DELETE: &str = "delete the task";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Credentials<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    user_name: Option<&'a str>,
    user_email: &'a str,
    user_password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginReply {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    user_name: Option<String>,
    #[serde(default)]
    user_email: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterReply {
    #[serde(default)]
    user_name: Option<String>,
    #[serde(default)]
    user_email: Option<String>,
}

/// The account that has just been created by [`Client::register`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisteredUser {
    pub name: String,
    pub email: String,
}

/// A client to the to-do server. This does not start a connection
#[derive(Clone, Debug)]
pub struct Client {
    url: Url,
    http: reqwest::Client,
}

impl Client {
    /// Create a client, given the root URL of the server (e.g. `http://localhost:8080`)
    pub fn new<S: AsRef<str>>(url: S) -> TodoResult<Self> {
        let url = Url::parse(url.as_ref())?;
        Self::from_url(url)
    }

    pub fn from_url(url: Url) -> TodoResult<Self> {
        if url.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase.into());
        }
        Ok(Self {
            url,
            http: reqwest::Client::new(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Build the URL of an endpoint, by appending path segments to the server URL
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Log in, and return the session the server has opened
    pub async fn login(&self, email: &str, password: &str) -> TodoResult<Session> {
        let credentials = Credentials{ user_name: None, user_email: email, user_password: password };
        let request = self.http
            .post(self.endpoint(&["auth", "login"]))
            .json(&credentials);

        let response = send(request, LOGIN).await?;
        let reply: LoginReply = response.json().await
            .map_err(|err| TodoError::reading(LOGIN, err))?;

        let token = match reply.token {
            Some(token) if token.is_empty() == false => token,
            _ => return Err(TodoError::Authentication(format!("the server did not return any token for {}", email))),
        };
        let user = UserProfile {
            name: reply.user_name.unwrap_or_default(),
            email: reply.user_email.unwrap_or_else(|| email.to_string()),
        };
        log::info!("Logged in as {}", user.email);
        Ok(Session::new(token, user))
    }

    /// Create a new account. This does not log in
    pub async fn register(&self, name: &str, email: &str, password: &str) -> TodoResult<RegisteredUser> {
        let credentials = Credentials{ user_name: Some(name), user_email: email, user_password: password };
        let request = self.http
            .post(self.endpoint(&["auth", "save"]))
            .json(&credentials);

        let response = send(request, REGISTER).await?;
        let text = response.text().await
            .map_err(|err| TodoError::reading(REGISTER, err))?;
        // Servers may reply anything from a full user object to a plain text message
        let reply: RegisterReply = serde_json::from_str(&text).unwrap_or_default();

        let user = RegisteredUser {
            name: reply.user_name.unwrap_or_else(|| name.to_string()),
            email: reply.user_email.unwrap_or_else(|| email.to_string()),
        };
        log::info!("Registered {}", user.email);
        Ok(user)
    }

    /// Returns a task source that acts on behalf of the given session
    pub fn with_session(&self, session: Session) -> RemoteTasks {
        RemoteTasks { client: self.clone(), session }
    }
}

/// Sends a request, and turns non-success statuses into errors
async fn send(request: RequestBuilder, operation: &'static str) -> TodoResult<Response> {
    let response = request
        .send()
        .await
        .map_err(|err| {
            log::error!("Unable to {}: {}", operation, err);
            TodoError::transport(operation, err)
        })?;

    let status = response.status();
    if status.is_success() == false {
        let body = response.text().await.unwrap_or_default();
        log::warn!("Unable to {}: unexpected HTTP status code {:?}", operation, status);
        return Err(TodoError::Status{ operation, status: status.as_u16(), body });
    }
    Ok(response)
}

/// The tasks of a logged-in user, on the server
#[derive(Clone, Debug)]
pub struct RemoteTasks {
    client: Client,
    session: Session,
}

impl RemoteTasks {
    pub fn session(&self) -> &Session {
        &self.session
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.client.endpoint(segments);
        log::debug!("{} {}", method, url);
        self.client.http
            .request(method, url)
            .bearer_auth(self.session.token())
    }
}

#[async_trait]
impl TaskApi for RemoteTasks {
    async fn list_by_date(&self, date: NaiveDate) -> TodoResult<Vec<Task>> {
        let date = date.format("%Y-%m-%d").to_string();
        let request = self.request(Method::GET, &["todo", "mydailys", "date", &date]);
        let response = send(request, LOAD).await?;
        response.json().await
            .map_err(|err| TodoError::reading(LOAD, err))
    }

    async fn create(&self, new_task: &NewTask) -> TodoResult<Task> {
        let request = self.request(Method::POST, &["todo", "create"])
            .json(new_task);
        let response = send(request, CREATE).await?;
        response.json().await
            .map_err(|err| TodoError::reading(CREATE, err))
    }

    async fn update(&self, id: &TaskId, update: &TaskUpdate) -> TodoResult<Task> {
        let request = self.request(Method::PUT, &["todo", "update", id.as_str()])
            .json(update);
        let response = send(request, UPDATE).await?;
        response.json().await
            .map_err(|err| TodoError::reading(UPDATE, err))
    }

    async fn toggle(&self, id: &TaskId) -> TodoResult<Task> {
        let request = self.request(Method::PUT, &["todo", "toggle", id.as_str()]);
        let response = send(request, TOGGLE).await?;
        response.json().await
            .map_err(|err| TodoError::reading(TOGGLE, err))
    }

    async fn delete(&self, id: &TaskId) -> TodoResult<()> {
        let request = self.request(Method::DELETE, &["todo", "delete", id.as_str()]);
        send(request, DELETE).await?;
        Ok(())
    }
}
