//! A scripted XML-RPC hub listening on 127.0.0.1.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use url::Url;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn is_call(&self, method: &str) -> bool {
        self.body
            .contains(&format!("<methodName>{method}</methodName>"))
    }
}

pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn value(value_xml: &str) -> Self {
        Self {
            status: 200,
            body: format!(
                "<?xml version='1.0'?>\n<methodResponse>\n<params>\n<param>\n\
                 <value>{value_xml}</value>\n</param>\n</params>\n</methodResponse>\n"
            ),
        }
    }

    pub fn fault(code: i64, message: &str) -> Self {
        Self {
            status: 200,
            body: format!(
                "<?xml version='1.0'?>\n<methodResponse>\n<fault>\n<value><struct>\n\
                 <member>\n<name>faultCode</name>\n<value><int>{code}</int></value>\n</member>\n\
                 <member>\n<name>faultString</name>\n<value><string>{message}</string></value>\n</member>\n\
                 </struct></value>\n</fault>\n</methodResponse>\n"
            ),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: "Internal Server Error".to_string(),
        }
    }
}

type Responder = dyn Fn(&RecordedRequest) -> Reply + Send + Sync;

pub struct FakeHub {
    url: Url,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeHub {
    /// Serve every request with `responder` until the test process exits.
    pub fn start(responder: impl Fn(&RecordedRequest) -> Reply + Send + Sync + 'static) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind fake hub");
        let addr = listener.local_addr().expect("Fake hub has no address");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let responder: Arc<Responder> = Arc::new(responder);

        let recorded = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let recorded = Arc::clone(&recorded);
                let responder = Arc::clone(&responder);
                thread::spawn(move || serve(stream, &recorded, responder.as_ref()));
            }
        });

        let url = Url::parse(&format!("http://{addr}/kojihub")).expect("Fake hub URL");
        Self { url, requests }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("request log poisoned").clone()
    }
}

fn serve(stream: TcpStream, recorded: &Mutex<Vec<RecordedRequest>>, responder: &Responder) {
    let mut writer = match stream.try_clone() {
        Ok(writer) => writer,
        Err(_) => return,
    };
    let mut reader = BufReader::new(stream);

    // Keep-alive: answer requests until the client hangs up.
    while let Some(request) = read_request(&mut reader) {
        let reply = responder(&request);
        recorded
            .lock()
            .expect("request log poisoned")
            .push(request);

        let response = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: text/xml\r\nContent-Length: {}\r\n\r\n{}",
            reply.status,
            if reply.status == 200 { "OK" } else { "Error" },
            reply.body.len(),
            reply.body
        );
        if writer.write_all(response.as_bytes()).is_err() {
            return;
        }
    }
}

fn read_request(reader: &mut BufReader<TcpStream>) -> Option<RecordedRequest> {
    let mut line = String::new();
    if reader.read_line(&mut line).ok()? == 0 {
        return None;
    }
    let mut parts = line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut headers = Vec::new();
    loop {
        let mut header = String::new();
        reader.read_line(&mut header).ok()?;
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        let (name, value) = header.split_once(':')?;
        headers.push((name.trim().to_string(), value.trim().to_string()));
    }

    let length = headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0; length];
    reader.read_exact(&mut body).ok()?;

    Some(RecordedRequest {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

/// `<struct>` value of one `listPackages` entry.
pub fn package_entry(id: i64, name: &str, owner: &str, blocked: bool) -> String {
    format!(
        "<struct>\
         <member><name>package_id</name><value><int>{id}</int></value></member>\
         <member><name>package_name</name><value><string>{name}</string></value></member>\
         <member><name>owner_name</name><value><string>{owner}</string></value></member>\
         <member><name>owner_id</name><value><int>3</int></value></member>\
         <member><name>blocked</name><value><boolean>{}</boolean></value></member>\
         <member><name>extra_arches</name><value><nil/></value></member>\
         </struct>",
        u8::from(blocked)
    )
}
