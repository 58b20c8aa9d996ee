use crate::config::Settings;
use crate::discord::announcements::GroupAnnouncer;
use crate::vrchat::models::{GroupAnnouncement, VRChatError};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::header::{CONTENT_TYPE, COOKIE, USER_AGENT};
use reqwest::{Client, Request};

pub const USER_AGENT_STRING: &str = concat!(
    "vrc-announcer/",
    env!("CARGO_PKG_VERSION"),
    " (Discord group announcement bot)"
);

pub struct VRChatClient {
    client: Client,
    api_base: String,
    auth_cookie: String,
    group_id: String,
}

impl VRChatClient {
    pub fn new(settings: &Settings) -> Result<Self, VRChatError> {
        let client = Client::builder()
            .build()
            .map_err(|e| VRChatError::Client(e.to_string()))?;

        Ok(VRChatClient {
            client,
            api_base: settings.vrchat_api_base.clone(),
            auth_cookie: settings.vrchat_cookie(),
            group_id: settings.group_id.clone(),
        })
    }

    pub fn announcement_url(&self) -> String {
        format!("{}/groups/{}/announcement", self.api_base, self.group_id)
    }

    pub fn build_announcement_request(&self, announcement: &GroupAnnouncement) -> Result<Request, VRChatError> {
        Ok(self.client.post(self.announcement_url())
            .header(CONTENT_TYPE, "application/json")
            .header(COOKIE, &self.auth_cookie)
            .header(USER_AGENT, USER_AGENT_STRING)
            .json(announcement)
            .build()?)
    }

    /// Publishes an announcement to the configured group. Any non-2xx status
    /// is an error carrying the response body.
    pub async fn post_group_announcement(&self, announcement: &GroupAnnouncement) -> Result<(), VRChatError> {
        let request = self.build_announcement_request(announcement)?;
        debug!("POST {}", request.url());

        let response = self.client.execute(request).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VRChatError::rejected(status, &body));
        }

        info!("Posted announcement \"{}\" to VRChat group {} ({})", announcement.title, self.group_id, status);
        Ok(())
    }
}

#[async_trait]
impl GroupAnnouncer for VRChatClient {
    async fn post_announcement(&self, announcement: &GroupAnnouncement) -> Result<(), VRChatError> {
        self.post_group_announcement(announcement).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    fn client_for(api_base: Option<String>) -> VRChatClient {
        let settings = Config {
            discord_token: Some("token".into()),
            vrc_auth_cookie: Some("authcookie_123".into()),
            group_id: Some("grp_0000".into()),
            vrchat_api_base: api_base,
            ..Config::default()
        }
        .validate()
        .unwrap();
        VRChatClient::new(&settings).unwrap()
    }

    fn client() -> VRChatClient {
        client_for(None)
    }

    fn maintenance() -> GroupAnnouncement {
        GroupAnnouncement {
            title: "Maintenance".into(),
            text: "Servers down 5pm UTC".into(),
        }
    }

    /// Answers one request with the given status line and body, returning the
    /// base URL to point the client at and the raw request it received.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            request
        });

        (base, handle)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let content_length = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn announcement_request_matches_group_endpoint() {
        let request = client().build_announcement_request(&maintenance()).unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(
            request.url().as_str(),
            "https://api.vrchat.cloud/api/1/groups/grp_0000/announcement"
        );

        let headers = request.headers();
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers[COOKIE], "auth=authcookie_123");
        assert_eq!(headers[USER_AGENT], USER_AGENT_STRING);

        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        let body: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(body, serde_json::json!({"title": "Maintenance", "text": "Servers down 5pm UTC"}));
    }

    #[test]
    fn content_type_is_not_duplicated() {
        let request = client()
            .build_announcement_request(&GroupAnnouncement { title: "t".into(), text: "d".into() })
            .unwrap();
        assert_eq!(request.headers().get_all(CONTENT_TYPE).iter().count(), 1);
    }

    #[tokio::test]
    async fn successful_post_sends_cookie_and_body() {
        let (base, server) = serve_once("200 OK", "{}").await;

        client_for(Some(base)).post_group_announcement(&maintenance()).await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /groups/grp_0000/announcement HTTP/1.1\r\n"));
        let lowered = request.to_lowercase();
        assert!(lowered.contains("cookie: auth=authcookie_123\r\n"));
        assert!(lowered.contains(&format!("user-agent: {}\r\n", USER_AGENT_STRING.to_lowercase())));
        assert!(request.ends_with(r#"{"title":"Maintenance","text":"Servers down 5pm UTC"}"#));
    }

    #[tokio::test]
    async fn rejected_post_carries_response_body() {
        let (base, server) = serve_once("403 Forbidden", "Forbidden").await;

        let err = client_for(Some(base)).post_group_announcement(&maintenance()).await.unwrap_err();
        server.await.unwrap();

        match &err {
            VRChatError::Rejected { status, .. } => assert_eq!(*status, StatusCode::FORBIDDEN),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.to_string(), "Forbidden");
    }

    #[tokio::test]
    async fn rejected_post_without_body_reports_status() {
        let (base, server) = serve_once("502 Bad Gateway", "").await;

        let err = client_for(Some(base)).post_group_announcement(&maintenance()).await.unwrap_err();
        server.await.unwrap();

        assert_eq!(err.to_string(), "502");
    }

    #[tokio::test]
    async fn unreachable_api_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let err = client_for(Some(base)).post_group_announcement(&maintenance()).await.unwrap_err();
        assert!(matches!(err, VRChatError::Http(_)), "unexpected error: {err:?}");
    }
}
