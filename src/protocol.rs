use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde_json::Value;

use crate::error::RequestError;

pub const CLIENT_TYPE: &str = "PC_WEB";
pub const API_VERSION: &str = "v-0.2.0";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// JSON-over-HTTP access to the gateway.
pub trait Transport {
    /// POSTs `body` with the gateway headers. Anything but `200 OK` is an error.
    fn post(&self, url: &str, body: &Value) -> Result<Value, RequestError>;

    /// Plain GET. Anything but `200 OK` is an error.
    fn get(&self, url: &str) -> Result<Value, RequestError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn post(&self, url: &str, body: &Value) -> Result<Value, RequestError> {
        (**self).post(url, body)
    }

    fn get(&self, url: &str) -> Result<Value, RequestError> {
        (**self).get(url)
    }
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    client_ip: String,
}

impl HttpTransport {
    pub fn new(client_ip: &str) -> Result<Self, reqwest::Error> {
        Self::with_timeout(client_ip, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(client_ip: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::from_client(client, client_ip))
    }

    pub fn from_client(client: Client, client_ip: &str) -> Self {
        Self {
            client,
            client_ip: client_ip.to_string(),
        }
    }
}

impl Transport for HttpTransport {
    fn post(&self, url: &str, body: &Value) -> Result<Value, RequestError> {
        let payload_json = serde_json::to_string(body).map_err(RequestError::Encode)?;

        debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("X-KM-IP-V4", self.client_ip.as_str())
            .header("X-KM-Client-Type", CLIENT_TYPE)
            .header("X-KM-Api-Version", API_VERSION)
            .body(payload_json)
            .send()
            .map_err(|e| {
                info!("Error placing request: {:?}", e);
                e
            })?;

        read_json(response)
    }

    fn get(&self, url: &str) -> Result<Value, RequestError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().map_err(|e| {
            info!("Error placing request: {:?}", e);
            e
        })?;

        read_json(response)
    }
}

fn read_json(response: Response) -> Result<Value, RequestError> {
    let status = response.status();
    let text = response.text()?;

    if status != StatusCode::OK {
        warn!("Received error status from gateway: {}", status);
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        return Err(RequestError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread::{self, JoinHandle};

    /// Serves a single HTTP response and hands back the raw request it received.
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
            request
        });

        (format!("http://{addr}"), handle)
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn transport() -> HttpTransport {
        let client = Client::builder().no_proxy().build().unwrap();
        HttpTransport::from_client(client, "203.0.113.7")
    }

    #[test]
    fn post_sends_gateway_headers_and_json_body() {
        let (base, server) = serve_once("200 OK", r#"{"sensitiveData":"abc"}"#);

        let response = transport()
            .post(&format!("{base}/check-out/initialize/M1/INV1"), &json!({"dateTime": "20240101000000"}))
            .unwrap();
        assert_eq!(response, json!({"sensitiveData": "abc"}));

        let request = server.join().unwrap();
        let lowered = request.to_lowercase();
        assert!(request.starts_with("POST /check-out/initialize/M1/INV1 HTTP/1.1"));
        assert!(lowered.contains("content-type: application/json"));
        assert!(lowered.contains("x-km-ip-v4: 203.0.113.7"));
        assert!(request.contains("PC_WEB"));
        assert!(lowered.contains("x-km-client-type: pc_web"));
        assert!(lowered.contains("x-km-api-version: v-0.2.0"));
        assert!(request.ends_with(r#"{"dateTime":"20240101000000"}"#));
    }

    #[test]
    fn get_sends_no_gateway_headers() {
        let (base, server) = serve_once("200 OK", r#"{"status":"Success"}"#);

        let response = transport()
            .get(&format!("{base}/verify/payment/REF1"))
            .unwrap();
        assert_eq!(response, json!({"status": "Success"}));

        let request = server.join().unwrap().to_lowercase();
        assert!(request.starts_with("get /verify/payment/ref1 http/1.1"));
        assert!(!request.contains("x-km-"));
    }

    #[test]
    fn non_200_carries_parsed_body() {
        let (base, server) = serve_once("400 Bad Request", r#"{"reason":"INVALID_SIGNATURE"}"#);

        let err = transport().post(&base, &json!({})).unwrap_err();
        server.join().unwrap();

        match err {
            RequestError::Status { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, json!({"reason": "INVALID_SIGNATURE"}));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn non_200_with_text_body_keeps_the_text() {
        let (base, server) = serve_once("502 Bad Gateway", "upstream down");

        let err = transport().get(&base).unwrap_err();
        server.join().unwrap();

        match err {
            RequestError::Status { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, json!("upstream down"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn non_json_success_is_a_decode_error() {
        let (base, server) = serve_once("200 OK", "<html></html>");

        let err = transport().get(&base).unwrap_err();
        server.join().unwrap();

        assert!(matches!(err, RequestError::Decode(_)), "{err:?}");
    }

    #[test]
    fn unreachable_gateway_is_a_transport_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let err = transport()
            .get(&format!("http://127.0.0.1:{port}/verify/payment/REF1"))
            .unwrap_err();
        assert!(matches!(err, RequestError::Transport(_)), "{err:?}");
    }
}
