//! Routing and dispatch behavior, driven through `DavService` without an
//! HTTP server.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use caldera_core::codec::Codec;
use caldera_core::error::CoreResult;
use caldera_core::store::{CalendarHandle, CalendarStore};
use caldera_core::types::{CalendarRef, ConditionalTag, Principal, ResourceUrl};
use caldera_dav::{DavRequest, DavService, Resolution, RootRouter, resolve};
use caldera_rfc::codec::XmlCodec;
use caldera_store::MemoryStore;
use http::header::{ALLOW, CONTENT_TYPE, HeaderValue, IF_MATCH};
use http::{Method, StatusCode};

const ORIGIN: &str = "http://cal.example.com";
const EVENT: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nUID:e1\r\nSUMMARY:Caf\u{e9}\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Delete {
        calendar: CalendarRef,
        url: String,
        tag: Option<String>,
    },
    Propfind {
        calendar: CalendarRef,
        url: String,
        body: Vec<u8>,
    },
    Put {
        calendar: CalendarRef,
        url: String,
        text: String,
        tag: Option<String>,
    },
    Report {
        calendar: CalendarRef,
        url: String,
        body: Vec<u8>,
    },
}

/// Codec recording every invocation and whether it changed storage.
#[derive(Default)]
struct RecordingCodec {
    calls: Mutex<Vec<Call>>,
    mutations: Mutex<usize>,
}

impl RecordingCodec {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn mutations(&self) -> usize {
        *self.mutations.lock().unwrap()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn mutate(
        &self,
        calendar: &dyn CalendarHandle,
        tag: Option<&ConditionalTag>,
        text: &str,
    ) -> CoreResult<()> {
        calendar.update(tag, &mut |_| {
            *self.mutations.lock().unwrap() += 1;
            Ok(text.to_owned())
        })
    }
}

impl Codec for RecordingCodec {
    fn delete(
        &self,
        tag: Option<&ConditionalTag>,
        calendar: &dyn CalendarHandle,
        url: &ResourceUrl,
    ) -> CoreResult<String> {
        self.record(Call::Delete {
            calendar: calendar.calendar().clone(),
            url: url.to_string(),
            tag: tag.map(ToString::to_string),
        });
        self.mutate(calendar, tag, "")?;
        Ok("<multistatus/>".to_string())
    }

    fn propfind(
        &self,
        body: &[u8],
        calendar: &dyn CalendarHandle,
        url: &ResourceUrl,
    ) -> CoreResult<String> {
        self.record(Call::Propfind {
            calendar: calendar.calendar().clone(),
            url: url.to_string(),
            body: body.to_vec(),
        });
        Ok("<propfind-answer/>".to_string())
    }

    fn put(
        &self,
        text: &str,
        calendar: &dyn CalendarHandle,
        url: &ResourceUrl,
        tag: Option<&ConditionalTag>,
    ) -> CoreResult<()> {
        self.record(Call::Put {
            calendar: calendar.calendar().clone(),
            url: url.to_string(),
            text: text.to_owned(),
            tag: tag.map(ToString::to_string),
        });
        self.mutate(calendar, tag, text)
    }

    fn report(
        &self,
        body: &[u8],
        calendar: &dyn CalendarHandle,
        url: &ResourceUrl,
    ) -> CoreResult<String> {
        self.record(Call::Report {
            calendar: calendar.calendar().clone(),
            url: url.to_string(),
            body: body.to_vec(),
        });
        Ok("<report-answer/>".to_string())
    }
}

struct Fixture {
    service: DavService,
    store: Arc<MemoryStore>,
    codec: Arc<RecordingCodec>,
}

fn calendar(principal: &str, name: &str) -> CalendarRef {
    CalendarRef::new(Principal::from(principal), name)
}

fn fixture_with(
    principals: &[&str],
    calendars: &[(&str, &str, &str)],
    default_encoding: &str,
) -> Fixture {
    let store = Arc::new(
        calendars
            .iter()
            .fold(MemoryStore::new(), |store, (principal, name, text)| {
                store.with_calendar_text(calendar(principal, name), text)
            }),
    );
    let codec = Arc::new(RecordingCodec::default());
    let principals = principals.iter().map(|p| Principal::from(*p)).collect();
    let root = RootRouter::new(&principals, &store.calendar_keys().unwrap());
    let service = DavService::new(root, store.clone(), codec.clone(), default_encoding);

    Fixture {
        service,
        store,
        codec,
    }
}

fn fixture() -> Fixture {
    fixture_with(
        &["alice", "bob"],
        &[
            ("alice", "work", ""),
            ("alice", "home", ""),
            ("bob", "team", ""),
        ],
        "utf-8",
    )
}

fn request(method: &str, path: &str) -> DavRequest {
    DavRequest::new(Method::from_bytes(method.as_bytes()).unwrap(), path, ORIGIN)
}

#[test_log::test]
fn known_paths_reach_exactly_their_calendar() {
    let fixture = fixture();
    let targets = [
        ("alice", "work"),
        ("alice", "home"),
        ("bob", "team"),
    ];

    for (principal, name) in targets {
        let path = format!("/{principal}/{name}");
        for method in ["PROPFIND", "REPORT", "PUT", "DELETE"] {
            let body = if method == "PUT" { EVENT } else { "" };
            let response = fixture
                .service
                .handle(&request(method, &path).with_body(body.as_bytes()));
            assert!(response.status.is_success(), "{method} {path}");
        }
    }

    let calls = fixture.codec.calls();
    assert_eq!(calls.len(), 12);
    for (chunk, (principal, name)) in calls.chunks(4).zip(targets) {
        let expected = calendar(principal, name);
        let url = format!("{ORIGIN}/{principal}/{name}");
        for call in chunk {
            let (bound, called_url) = match call {
                Call::Delete { calendar, url, .. }
                | Call::Propfind { calendar, url, .. }
                | Call::Put { calendar, url, .. }
                | Call::Report { calendar, url, .. } => (calendar, url),
            };
            assert_eq!(*bound, expected);
            assert_eq!(*called_url, url);
        }
    }
}

#[test_log::test]
fn unknown_principal_or_calendar_is_not_found() {
    let fixture = fixture();

    for path in ["/carol/work", "/alice/team", "/bob/work", "/alice", "/"] {
        for method in ["PROPFIND", "REPORT", "PUT", "DELETE", "OPTIONS"] {
            let response = fixture
                .service
                .handle(&request(method, path).with_body(EVENT.as_bytes()));

            assert_eq!(response.status, StatusCode::NOT_FOUND, "{method} {path}");
            assert!(response.body.is_empty());
        }
    }

    assert!(fixture.codec.calls().is_empty());
}

#[test_log::test]
fn resolution_is_callable_without_service() {
    let fixture = fixture();
    let root = fixture.service.root();

    let found = resolve(root, fixture.store.as_ref(), "/bob/team").unwrap();
    let missing = resolve(root, fixture.store.as_ref(), "/bob/work").unwrap();

    assert!(matches!(found, Resolution::Found(e) if *e.calendar() == calendar("bob", "team")));
    assert!(matches!(missing, Resolution::NotFound(_)));
}

#[test_log::test]
fn options_advertises_exact_capabilities() {
    let fixture = fixture_with(&["alice"], &[("alice", "work", EVENT)], "utf-8");

    let response = fixture.service.handle(&request("OPTIONS", "/alice/work"));

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.headers.get(ALLOW).unwrap(),
        "DELETE, OPTIONS, PROPFIND, PUT, REPORT"
    );
    assert_eq!(response.headers.get("dav").unwrap(), "1, calendar-access");
    assert!(response.body.is_empty());
    assert!(fixture.codec.calls().is_empty());
}

#[test_log::test]
fn unsupported_method_is_not_allowed() {
    let fixture = fixture();

    let response = fixture.service.handle(&request("MKCOL", "/alice/work"));

    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        response.headers.get(ALLOW).unwrap(),
        "DELETE, OPTIONS, PROPFIND, PUT, REPORT"
    );
    assert!(fixture.codec.calls().is_empty());
}

#[test_log::test]
fn propfind_and_report_return_codec_multistatus() {
    let fixture = fixture();

    let propfind = fixture
        .service
        .handle(&request("PROPFIND", "/alice/work").with_body(b"<propfind/>".to_vec()));
    let report = fixture
        .service
        .handle(&request("REPORT", "/alice/work").with_body(b"<query/>".to_vec()));

    assert_eq!(propfind.status, StatusCode::MULTI_STATUS);
    assert_eq!(propfind.body, "<propfind-answer/>");
    assert_eq!(
        propfind.headers.get(CONTENT_TYPE).unwrap(),
        "application/xml; charset=utf-8"
    );
    assert_eq!(report.status, StatusCode::MULTI_STATUS);
    assert_eq!(report.body, "<report-answer/>");
    assert_eq!(
        fixture.codec.calls(),
        vec![
            Call::Propfind {
                calendar: calendar("alice", "work"),
                url: format!("{ORIGIN}/alice/work"),
                body: b"<propfind/>".to_vec(),
            },
            Call::Report {
                calendar: calendar("alice", "work"),
                url: format!("{ORIGIN}/alice/work"),
                body: b"<query/>".to_vec(),
            },
        ]
    );
}

#[test_log::test]
fn put_decodes_with_declared_charset() {
    let fixture = fixture_with(&["alice"], &[("alice", "work", "")], "iso-8859-1");

    let response = fixture.service.handle(
        &request("PUT", "/alice/work")
            .with_header(
                CONTENT_TYPE,
                HeaderValue::from_static("text/calendar; charset=utf-8"),
            )
            .with_body(EVENT.as_bytes()),
    );

    assert_eq!(response.status, StatusCode::CREATED);
    assert!(response.body.is_empty());
    assert!(matches!(
        fixture.codec.calls().as_slice(),
        [Call::Put { text, tag: None, .. }] if text == EVENT
    ));
}

#[test_log::test]
fn put_without_content_type_uses_default_encoding() {
    let fixture = fixture_with(&["alice"], &[("alice", "work", "")], "iso-8859-1");
    let (latin1, _, _) = encoding_rs::WINDOWS_1252.encode(EVENT);

    let response = fixture
        .service
        .handle(&request("PUT", "/alice/work").with_body(latin1.into_owned()));

    assert_eq!(response.status, StatusCode::CREATED);
    assert!(matches!(
        fixture.codec.calls().as_slice(),
        [Call::Put { text, .. }] if text == EVENT
    ));
}

#[test_log::test]
fn put_with_undecodable_body_never_reaches_codec() {
    let fixture = fixture();

    let response = fixture.service.handle(
        &request("PUT", "/alice/work")
            .with_header(
                CONTENT_TYPE,
                HeaderValue::from_static("text/calendar; charset=utf-8"),
            )
            .with_body(b"Caf\xe9".to_vec()),
    );

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(fixture.codec.calls().is_empty());
}

#[test_log::test]
fn put_with_unknown_charset_is_unsupported() {
    let fixture = fixture();

    let response = fixture.service.handle(
        &request("PUT", "/alice/work")
            .with_header(
                CONTENT_TYPE,
                HeaderValue::from_static("text/calendar; charset=x-unknown"),
            )
            .with_body(EVENT.as_bytes()),
    );

    assert_eq!(response.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(fixture.codec.calls().is_empty());
}

#[test_log::test]
fn conflicting_tags_do_not_mutate_storage() {
    let fixture = fixture_with(&["alice"], &[("alice", "work", EVENT)], "utf-8");
    let work = calendar("alice", "work");
    let stale = HeaderValue::from_static("\"stale\"");

    let put = fixture.service.handle(
        &request("PUT", "/alice/work")
            .with_header(IF_MATCH, stale.clone())
            .with_body(b"BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n".to_vec()),
    );
    let delete = fixture
        .service
        .handle(&request("DELETE", "/alice/work").with_header(IF_MATCH, stale));

    assert_eq!(put.status, StatusCode::PRECONDITION_FAILED);
    assert_eq!(delete.status, StatusCode::PRECONDITION_FAILED);
    assert_eq!(fixture.codec.calls().len(), 2);
    assert_eq!(fixture.codec.mutations(), 0);
    assert_eq!(fixture.store.text_of(&work).as_deref(), Some(EVENT));
}

#[test_log::test]
fn matching_tag_allows_delete() {
    let fixture = fixture_with(&["alice"], &[("alice", "work", EVENT)], "utf-8");
    let work = calendar("alice", "work");
    let etag = fixture.store.open(&work).unwrap().etag().unwrap();

    let response = fixture.service.handle(
        &request("DELETE", "/alice/work").with_header(IF_MATCH, HeaderValue::from_str(&etag).unwrap()),
    );

    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(fixture.store.text_of(&work).as_deref(), Some(""));
}

#[test_log::test]
fn matching_tag_allows_put() {
    let fixture = fixture_with(&["alice"], &[("alice", "work", EVENT)], "utf-8");
    let work = calendar("alice", "work");
    let etag = fixture.store.open(&work).unwrap().etag().unwrap();
    let replacement = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nEND:VCALENDAR\r\n";

    let response = fixture.service.handle(
        &request("PUT", "/alice/work")
            .with_header(IF_MATCH, HeaderValue::from_str(&etag).unwrap())
            .with_body(replacement.as_bytes()),
    );

    assert_eq!(response.status, StatusCode::CREATED);
    assert!(response.body.is_empty());
    assert!(matches!(
        fixture.codec.calls().as_slice(),
        [Call::Put { tag: Some(tag), .. }] if *tag == etag
    ));
    assert_eq!(fixture.codec.mutations(), 1);
    assert_eq!(fixture.store.text_of(&work).as_deref(), Some(replacement));
}

#[test_log::test]
fn delete_without_tag_is_unconditional() {
    let fixture = fixture_with(&["alice"], &[("alice", "work", EVENT)], "utf-8");

    let response = fixture.service.handle(&request("DELETE", "/alice/work"));

    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert!(response.body.is_empty());
    assert_eq!(
        fixture.codec.calls(),
        vec![Call::Delete {
            calendar: calendar("alice", "work"),
            url: format!("{ORIGIN}/alice/work"),
            tag: None,
        }]
    );
    assert_eq!(fixture.codec.mutations(), 1);
    assert_eq!(
        fixture.store.text_of(&calendar("alice", "work")).as_deref(),
        Some("")
    );
}

#[test_log::test]
fn alice_work_end_to_end() {
    let fixture = fixture_with(&["alice"], &[("alice", "work", "")], "utf-8");
    let body = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nEND:VCALENDAR\r\n";

    let put = fixture
        .service
        .handle(&request("PUT", "/alice/work").with_body(body.as_bytes()));

    assert_eq!(put.status, StatusCode::CREATED);
    assert_eq!(
        fixture.codec.calls(),
        vec![Call::Put {
            calendar: calendar("alice", "work"),
            url: format!("{ORIGIN}/alice/work"),
            text: body.to_string(),
            tag: None,
        }]
    );

    let propfind = fixture.service.handle(&request("PROPFIND", "/bob/anything"));

    assert_eq!(propfind.status, StatusCode::NOT_FOUND);
    assert_eq!(fixture.codec.calls().len(), 1);
}

#[test_log::test]
fn xml_codec_round_trip_through_service() {
    let store = Arc::new(MemoryStore::new().with_calendar(calendar("alice", "work")));
    let principals = BTreeSet::from([Principal::from("alice")]);
    let root = RootRouter::new(&principals, &store.calendar_keys().unwrap());
    let service = DavService::new(root, store.clone(), Arc::new(XmlCodec::new()), "utf-8");

    let put = service.handle(&request("PUT", "/alice/work").with_body(EVENT.as_bytes()));
    let report = service.handle(
        &request("REPORT", "/alice/work").with_body(
            br#"<C:calendar-query xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav"><D:prop><D:getetag/></D:prop></C:calendar-query>"#.to_vec(),
        ),
    );
    let bad = service.handle(&request("REPORT", "/alice/work").with_body(b"<oops".to_vec()));

    assert_eq!(put.status, StatusCode::CREATED);
    assert_eq!(report.status, StatusCode::MULTI_STATUS);
    assert!(report.body.contains("http://cal.example.com/alice/work/e1.ics"));
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
}
