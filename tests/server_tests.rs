//! End-to-end tests for static delivery through a started server.

mod common;

use common::fixtures::{free_port, local_addr, PackageTree};
use common::http::{get, send_raw};
use polyserve::{start_server_with, RunningServer, ServerOptions, TcpPortScanner};
use std::net::SocketAddr;

fn start(tree: &PackageTree, package_name: Option<&str>) -> (RunningServer, SocketAddr) {
    common::init_runtime();
    let port = free_port();
    let options = ServerOptions {
        port: Some(port),
        host: Some("127.0.0.1".to_string()),
        root: Some(tree.root().to_path_buf()),
        component_dir: Some(tree.component_dir().to_string_lossy().into_owned()),
        package_name: package_name.map(str::to_string),
        headers: vec![("X-Polyserve".to_string(), "yes".to_string())],
        proxy: None,
        ..ServerOptions::default()
    };
    let server = start_server_with(&options, &TcpPortScanner).unwrap();
    server.handle().wait_ready().unwrap();
    (server, local_addr(port))
}

#[test]
fn test_base_url_and_package_name() {
    let tree = PackageTree::new(None);
    let (server, addr) = start(&tree, Some("my-pkg"));
    assert_eq!(server.package_name(), "my-pkg");
    assert_eq!(
        server.base_url(),
        format!("http://127.0.0.1:{}/components/my-pkg/", addr.port())
    );
    assert_eq!(server.page_url(), None);
    server.stop();
}

#[test]
fn test_root_redirects_to_package() {
    let tree = PackageTree::new(None);
    let (server, addr) = start(&tree, Some("my-pkg"));
    let resp = get(&addr, "/");
    assert_eq!(resp.status, 301);
    assert_eq!(resp.header("location"), Some("/components/my-pkg/"));
    server.stop();
}

#[test]
fn test_mount_root_redirects_to_package() {
    let tree = PackageTree::new(None);
    let (server, addr) = start(&tree, Some("my-pkg"));
    let resp = get(&addr, "/components/");
    assert_eq!(resp.status, 301);
    assert_eq!(resp.header("location"), Some("./my-pkg/"));
    server.stop();
}

#[test]
fn test_package_index_and_files() {
    let tree = PackageTree::new(None);
    let (server, addr) = start(&tree, Some("my-pkg"));

    let resp = get(&addr, "/components/my-pkg/");
    assert_eq!(resp.status, 200);
    assert_eq!(resp.text(), "<h1>package index</h1>");
    assert!(resp.header("content-type").unwrap().starts_with("text/html"));

    let resp = get(&addr, "/components/my-pkg/my-pkg.html");
    assert_eq!(resp.status, 200);
    assert!(resp.text().contains("dom-module"));

    let resp = get(&addr, "/components/my-pkg/demo/");
    assert_eq!(resp.status, 200);
    assert_eq!(resp.text(), "<h1>demo</h1>");
    server.stop();
}

#[test]
fn test_directory_without_slash_redirects() {
    let tree = PackageTree::new(None);
    let (server, addr) = start(&tree, Some("my-pkg"));
    let resp = get(&addr, "/components/my-pkg/demo");
    assert_eq!(resp.status, 301);
    assert_eq!(resp.header("location"), Some("/components/my-pkg/demo/"));
    server.stop();
}

#[test]
fn test_dependency_served_from_component_dir() {
    let tree = PackageTree::new(None);
    let (server, addr) = start(&tree, Some("my-pkg"));

    let resp = get(&addr, "/components/some-dep/foo.js");
    assert_eq!(resp.status, 200);
    assert_eq!(resp.text(), "console.log('foo');");
    assert!(resp
        .header("content-type")
        .unwrap()
        .starts_with("application/javascript"));

    let resp = get(&addr, "/components/some-dep/");
    assert_eq!(resp.status, 200);
    assert_eq!(resp.text(), "<h1>some-dep</h1>");
    server.stop();
}

#[test]
fn test_missing_files_are_not_found() {
    let tree = PackageTree::new(None);
    let (server, addr) = start(&tree, Some("my-pkg"));
    assert_eq!(get(&addr, "/components/my-pkg/nope.html").status, 404);
    assert_eq!(get(&addr, "/components/other-dep/x.js").status, 404);
    assert_eq!(get(&addr, "/elsewhere/index.html").status, 404);
    server.stop();
}

#[test]
fn test_traversal_is_forbidden() {
    let tree = PackageTree::new(None);
    let (server, addr) = start(&tree, Some("my-pkg"));
    let resp = send_raw(
        &addr,
        "GET /components/some-dep/../../secret.txt HTTP/1.1\r\nHost: localhost\r\n\r\n",
    );
    assert_eq!(resp.status, 403);
    assert!(!resp.text().contains("top secret"));

    let resp = get(&addr, "/components/some-dep/%2e%2e/%2e%2e/secret.txt");
    assert_eq!(resp.status, 403);
    server.stop();
}

#[test]
fn test_dotfiles_are_hidden() {
    let tree = PackageTree::new(None);
    let (server, addr) = start(&tree, Some("my-pkg"));
    let resp = get(&addr, "/components/my-pkg/.hidden");
    assert_eq!(resp.status, 404);
    assert!(!resp.text().contains("hidden"));
    server.stop();
}

#[test]
fn test_bad_encoding_is_rejected() {
    let tree = PackageTree::new(None);
    let (server, addr) = start(&tree, Some("my-pkg"));
    assert_eq!(get(&addr, "/components/my-pkg/%ff.html").status, 400);
    server.stop();
}

#[test]
fn test_only_get_and_head_serve_files() {
    let tree = PackageTree::new(None);
    let (server, addr) = start(&tree, Some("my-pkg"));

    let resp = send_raw(
        &addr,
        "POST /components/my-pkg/index.html HTTP/1.1\r\nHost: localhost\r\nContent-Length: 0\r\n\r\n",
    );
    assert_eq!(resp.status, 404);

    let resp = send_raw(
        &addr,
        "HEAD /components/my-pkg/index.html HTTP/1.1\r\nHost: localhost\r\n\r\n",
    );
    assert_eq!(resp.status, 200);
    server.stop();
}

#[test]
fn test_head_advertises_file_length() {
    let tree = PackageTree::new(None);
    let (server, addr) = start(&tree, Some("my-pkg"));

    let get_resp = get(&addr, "/components/my-pkg/index.html");
    let head_resp = send_raw(
        &addr,
        "HEAD /components/my-pkg/index.html HTTP/1.1\r\nHost: localhost\r\n\r\n",
    );
    assert_eq!(head_resp.status, 200);
    let expected = "<h1>package index</h1>".len().to_string();
    assert_eq!(get_resp.header("content-length"), Some(expected.as_str()));
    assert_eq!(head_resp.header("content-length"), Some(expected.as_str()));
    assert_eq!(head_resp.header("content-type"), get_resp.header("content-type"));
    assert_eq!(head_resp.header("connection"), Some("close"));
    server.stop();
}

#[test]
fn test_extra_headers_on_served_files() {
    let tree = PackageTree::new(None);
    let (server, addr) = start(&tree, Some("my-pkg"));
    let resp = get(&addr, "/components/my-pkg/index.html");
    assert_eq!(resp.status, 200);
    assert_eq!(resp.header("x-polyserve"), Some("yes"));
    server.stop();
}

#[test]
fn test_bower_name_used_when_not_configured() {
    let tree = PackageTree::new(Some("bower-pkg"));
    let (server, addr) = start(&tree, None);
    assert_eq!(server.package_name(), "bower-pkg");

    let resp = get(&addr, "/");
    assert_eq!(resp.header("location"), Some("/components/bower-pkg/"));

    let resp = get(&addr, "/components/bower-pkg/index.html");
    assert_eq!(resp.status, 200);
    assert_eq!(resp.text(), "<h1>package index</h1>");
    server.stop();
}
