//! Integration tests for the XML-RPC hub client against a local fake hub

mod support;

use std::time::Duration;

use tagsync_core::endpoint::EndpointRef;
use tagsync_core::error::{HubError, SessionFailure};
use tagsync_core::hub::{HubClient, HubSessionFactory, KojiSession, PackageEntry, SessionFactory};
use tagsync_core::config::ProfileLoader;
use tagsync_core::sync::{SyncCommand, SyncOptions, WriterReporter};

use support::{FakeHub, Reply, package_entry};

const TIMEOUT: Duration = Duration::from_secs(10);

fn package_list() -> String {
    format!(
        "<array><data><value>{}</value><value>{}</value></data></array>",
        package_entry(1, "foo", "alice", false),
        package_entry(2, "bar", "bob", true)
    )
}

fn empty_loader() -> ProfileLoader {
    ProfileLoader::new(Vec::new(), None)
}

#[test]
fn list_packages_sends_tag_as_keyword_argument() {
    let hub = FakeHub::start(|_| Reply::value(&package_list()));
    let client = HubClient::anonymous(hub.url().clone(), TIMEOUT).expect("client should build");

    let entries = client.list_packages("f40").expect("listPackages should succeed");

    assert_eq!(
        entries,
        vec![
            PackageEntry::new(1, "foo", "alice", false),
            PackageEntry::new(2, "bar", "bob", true),
        ]
    );

    let requests = hub.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/kojihub");
    assert_eq!(request.header("content-type"), Some("text/xml"));
    assert!(request.is_call("listPackages"));
    assert!(request.body.contains(
        "<member><name>__starstar</name><value><boolean>1</boolean></value></member>\
         <member><name>tagID</name><value><string>f40</string></value></member>"
    ));
    assert!(request.header("Koji-Session-Id").is_none());
}

#[test]
fn package_list_add_sends_owner_and_block() {
    let hub = FakeHub::start(|_| Reply::value("<nil/>"));
    let client = HubClient::anonymous(hub.url().clone(), TIMEOUT).expect("client should build");

    client
        .package_list_add("c9s-extras", "foo & co", "carol", true)
        .expect("packageListAdd should succeed");

    let request = &hub.requests()[0];
    assert!(request.is_call("packageListAdd"));
    assert!(request.body.contains(
        "<param><value><string>c9s-extras</string></value></param>\
         <param><value><string>foo &amp; co</string></value></param>"
    ));
    assert!(request.body.contains(
        "<member><name>block</name><value><boolean>1</boolean></value></member>\
         <member><name>owner</name><value><string>carol</string></value></member>"
    ));
}

#[test]
fn faults_become_hub_errors() {
    let hub = FakeHub::start(|_| Reply::fault(1000, "No such tagInfo: 'nosuch'"));
    let client = HubClient::anonymous(hub.url().clone(), TIMEOUT).expect("client should build");

    let err = client.list_packages("nosuch").expect_err("fault expected");

    match err {
        HubError::Fault { code, message } => {
            assert_eq!(code, 1000);
            assert_eq!(message, "No such tagInfo: 'nosuch'");
        }
        other => panic!("expected fault, got {other:?}"),
    }
}

#[test]
fn http_errors_carry_the_status() {
    let hub = FakeHub::start(|_| Reply::status(500));
    let client = HubClient::anonymous(hub.url().clone(), TIMEOUT).expect("client should build");

    let err = client.list_packages("f40").expect_err("HTTP 500 expected");

    assert!(matches!(err, HubError::Status { status: 500, .. }));
}

#[test]
fn login_adds_session_headers_with_increasing_callnum() {
    let hub = FakeHub::start(|request| {
        if request.is_call("sslLogin") {
            Reply::value(
                "<struct>\
                 <member><name>session-id</name><value><int>42</int></value></member>\
                 <member><name>session-key</name><value><string>42-abcdef</string></value></member>\
                 </struct>",
            )
        } else {
            Reply::value(&package_list())
        }
    });

    let mut client =
        HubClient::anonymous(hub.url().clone(), TIMEOUT).expect("client should build");
    let login_url = hub.url().clone();
    client
        .ssl_login(&login_url, Some("Negotiate dG9rZW4="))
        .expect("login should succeed");
    assert!(client.is_logged_in());
    assert_eq!(client.session().map(|s| s.id), Some(42));

    client.list_packages("f40").expect("first call");
    client.list_packages("f41").expect("second call");

    let requests = hub.requests();
    assert_eq!(requests.len(), 3);

    let login = &requests[0];
    assert_eq!(login.header("Authorization"), Some("Negotiate dG9rZW4="));
    assert!(login.header("Koji-Session-Id").is_none());

    for (request, callnum) in requests[1..].iter().zip(["0", "1"]) {
        assert_eq!(request.header("Koji-Session-Id"), Some("42"));
        assert_eq!(request.header("Koji-Session-Key"), Some("42-abcdef"));
        assert_eq!(request.header("Koji-Session-Callnum"), Some(callnum));
        assert!(request.header("Authorization").is_none());
    }
}

#[test]
fn login_without_session_is_rejected() {
    let hub = FakeHub::start(|_| Reply::value("<struct></struct>"));
    let mut client =
        HubClient::anonymous(hub.url().clone(), TIMEOUT).expect("client should build");
    let login_url = hub.url().clone();

    let err = client
        .ssl_login(&login_url, None)
        .expect_err("login must fail");

    assert!(matches!(err, HubError::Login(_)));
    assert!(!client.is_logged_in());
}

#[test]
fn direct_url_endpoints_get_anonymous_sessions() {
    let hub = FakeHub::start(|_| Reply::value(&package_list()));
    let factory = HubSessionFactory::new(empty_loader());
    let endpoint = EndpointRef::classify(hub.url().as_str());
    assert!(endpoint.is_direct_url());

    let session = factory.open(&endpoint).expect("anonymous session");
    let entries = session.list_packages("f40").expect("listing");

    assert_eq!(entries.len(), 2);
    assert!(
        hub.requests()
            .iter()
            .all(|request| !request.is_call("sslLogin"))
    );
}

#[cfg(not(feature = "gssapi"))]
#[test]
fn kerberos_profiles_need_gssapi_support() {
    let temp = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config = temp.path().join("koji.conf");
    std::fs::write(&config, "[koji]\nserver = http://127.0.0.1:9/kojihub\n")
        .expect("Failed to write config");
    let factory = HubSessionFactory::new(ProfileLoader::new(vec![config], None));

    let err = factory
        .open(&EndpointRef::classify("koji"))
        .err()
        .expect("login must fail");

    assert!(matches!(
        err.source,
        SessionFailure::Hub(HubError::Unsupported(_))
    ));
    assert!(err.to_string().contains("gssapi"));
}

#[test]
fn sync_between_two_hubs() {
    let source = FakeHub::start(|_| Reply::value(&package_list()));
    let target = FakeHub::start(|request| {
        if request.body.contains("<string>bar</string>") {
            Reply::fault(1000, "User bob is disabled")
        } else {
            Reply::value("<nil/>")
        }
    });

    let cmd = SyncCommand::new(HubSessionFactory::new(empty_loader()));
    let options = SyncOptions::new(source.url().as_str(), "f40", target.url().as_str(), "c9s");
    let mut reporter = WriterReporter::new(Vec::new());

    let report = cmd
        .execute(&options, &mut reporter)
        .expect("per-package failures are not fatal");
    let output = String::from_utf8(reporter.into_inner()).unwrap();

    assert_eq!(report.processed, 2);
    assert_eq!(report.applied, 1);
    assert_eq!(
        output,
        "Error adding package bar: User bob is disabled (fault 1000)\n\
         All packages have been synchronized.\n"
    );

    assert_eq!(source.requests().len(), 1);
    let adds = target.requests();
    assert_eq!(adds.len(), 2);
    assert!(adds.iter().all(|request| request.is_call("packageListAdd")));
}
