#![allow(dead_code)]

pub mod http {
    use std::collections::HashMap;
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpStream};
    use std::time::{Duration, Instant};

    /// Parsed response: status, lowercased headers (repeats kept), body.
    pub struct TestResponse {
        pub status: u16,
        pub headers: Vec<(String, String)>,
        pub body: Vec<u8>,
    }

    impl TestResponse {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        }

        pub fn text(&self) -> String {
            String::from_utf8_lossy(&self.body).to_string()
        }

        pub fn header_map(&self) -> HashMap<String, String> {
            self.headers.iter().cloned().collect()
        }
    }

    /// Head of a response plus the offsets of its body.
    fn parse_head(raw: &[u8]) -> Option<(TestResponse, usize, usize)> {
        let body_start = raw.windows(4).position(|w| w == b"\r\n\r\n")? + 4;
        let head = String::from_utf8_lossy(&raw[..body_start]).to_string();
        let mut lines = head.lines();
        let status = lines.next()?.split_whitespace().nth(1)?.parse().ok()?;
        let headers: Vec<(String, String)> = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
            .collect();
        let length: usize = headers
            .iter()
            .find(|(k, _)| k == "content-length")
            .and_then(|(_, v)| v.parse().ok())
            .unwrap_or(0);
        let response = TestResponse {
            status,
            headers,
            body: Vec::new(),
        };
        Some((response, body_start, body_start + length))
    }

    /// Send a raw HTTP request and read one complete response.
    pub fn send_raw(addr: &SocketAddr, req: &str) -> TestResponse {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(req.as_bytes()).unwrap();
        stream.set_read_timeout(Some(Duration::from_millis(200))).unwrap();
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut buf = Vec::new();
        loop {
            if let Some((mut response, body_start, body_end)) = parse_head(&buf) {
                if buf.len() >= body_end {
                    response.body = buf[body_start..body_end].to_vec();
                    return response;
                }
            }
            let mut tmp = [0u8; 4096];
            match stream.read(&mut tmp) {
                Ok(0) => break,
                Ok(n) => buf.extend_from_slice(&tmp[..n]),
                Err(ref e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    if Instant::now() > deadline {
                        break;
                    }
                }
                Err(e) => panic!("read error: {:?}", e),
            }
        }
        let (mut response, body_start, _) = parse_head(&buf).expect("incomplete HTTP response");
        response.body = buf[body_start..].to_vec();
        response
    }

    pub fn get(addr: &SocketAddr, path: &str) -> TestResponse {
        send_raw(addr, &format!("GET {path} HTTP/1.1\r\nHost: localhost\r\n\r\n"))
    }
}

pub mod fixtures {
    use std::fs;
    use std::net::{SocketAddr, TcpListener};
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// A package checkout: own files at the root, one dependency installed.
    ///
    /// ```text
    /// <root>/index.html
    /// <root>/my-pkg.html
    /// <root>/demo/index.html
    /// <root>/secret.txt
    /// <root>/.hidden
    /// <root>/bower_components/some-dep/foo.js
    /// <root>/bower_components/some-dep/index.html
    /// ```
    pub struct PackageTree {
        pub dir: TempDir,
    }

    impl PackageTree {
        pub fn new(bower_name: Option<&str>) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let root = dir.path();
            fs::create_dir_all(root.join("demo")).unwrap();
            fs::create_dir_all(root.join("bower_components/some-dep")).unwrap();
            fs::write(root.join("index.html"), "<h1>package index</h1>").unwrap();
            fs::write(root.join("my-pkg.html"), "<dom-module id=\"my-pkg\"></dom-module>").unwrap();
            fs::write(root.join("demo/index.html"), "<h1>demo</h1>").unwrap();
            fs::write(root.join("secret.txt"), "top secret").unwrap();
            fs::write(root.join(".hidden"), "hidden").unwrap();
            fs::write(
                root.join("bower_components/some-dep/foo.js"),
                "console.log('foo');",
            )
            .unwrap();
            fs::write(
                root.join("bower_components/some-dep/index.html"),
                "<h1>some-dep</h1>",
            )
            .unwrap();
            if let Some(name) = bower_name {
                fs::write(root.join("bower.json"), format!(r#"{{"name": "{name}"}}"#)).unwrap();
            }
            Self { dir }
        }

        pub fn root(&self) -> &Path {
            self.dir.path()
        }

        pub fn component_dir(&self) -> PathBuf {
            self.dir.path().join("bower_components")
        }
    }

    /// A port that was free a moment ago.
    pub fn free_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        port
    }

    pub fn local_addr(port: u16) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], port))
    }
}

/// Coroutine stack large enough for file reads and the blocking proxy client.
pub fn init_runtime() {
    polyserve::runtime_config::RuntimeConfig {
        stack_size: 0x20000,
        workers: None,
    }
    .apply();
}
