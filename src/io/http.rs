use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT_RANGES, CONTENT_LENGTH, RANGE};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use super::ReadAt;
use anyhow::{Context, Result, anyhow, bail};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RETRY: u32 = 10;

/// Remote archive read through HTTP `Range` requests.
///
/// Only the bytes the tar reader actually walks over are fetched, so pulling
/// the `info` part out of a large package costs a few kilobytes.
pub struct HttpRangeReader {
    client: Client,
    url: String,
    size: u64,
    transferred_bytes: AtomicU64,
}

impl HttpRangeReader {
    /// Probe `url` with a HEAD request.
    ///
    /// Fails unless the server advertises `Accept-Ranges: bytes` and reports
    /// a `Content-Length`.
    pub fn new(url: String) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Self::with_client(client, url)
    }

    /// Like [`HttpRangeReader::new`], with a caller-configured client.
    pub fn with_client(client: Client, url: String) -> Result<Self> {
        let resp = client
            .head(&url)
            .send()
            .with_context(|| format!("cannot reach {url}"))?;

        if !resp.status().is_success() {
            bail!("HTTP request failed with status: {}", resp.status());
        }

        let headers = resp.headers();
        let ranged = headers
            .get(ACCEPT_RANGES)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("bytes"));
        if !ranged {
            bail!("Remote server does not support Range requests");
        }

        let size = headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| anyhow!("Remote server did not return Content-Length"))?;

        log::debug!("remote archive {url} is {size} bytes");

        Ok(Self {
            client,
            url,
            size,
            transferred_bytes: AtomicU64::new(0),
        })
    }

    /// Get total bytes transferred from network
    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes.load(Ordering::Relaxed)
    }

    /// GET one inclusive byte range, retrying timeouts and refused connections.
    fn fetch(&self, first: u64, last: u64) -> Result<Vec<u8>> {
        let range = format!("bytes={first}-{last}");
        let mut attempt = 0;

        loop {
            match self.client.get(&self.url).header(RANGE, &range).send() {
                Ok(resp) => {
                    if resp.status() != StatusCode::PARTIAL_CONTENT {
                        bail!("HTTP request failed with status: {}", resp.status());
                    }
                    let body = resp.bytes()?;
                    log::trace!("fetched {range} ({} bytes)", body.len());
                    return Ok(body.to_vec());
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    attempt += 1;
                    if attempt >= MAX_RETRY {
                        bail!("Max retries exceeded fetching {range}");
                    }
                    log::warn!("Connection error, retry {attempt}/{MAX_RETRY}: {e}");
                    thread::sleep(Duration::from_millis(500 * u64::from(attempt)));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl ReadAt for HttpRangeReader {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() || offset >= self.size {
            return Ok(0);
        }

        let last = (offset + buf.len() as u64 - 1).min(self.size - 1);
        let wanted = (last - offset + 1) as usize;
        let mut received = 0;

        // servers may answer with less than the requested range
        while received < wanted {
            let chunk = self.fetch(offset + received as u64, last)?;
            if chunk.is_empty() {
                bail!("Remote server returned an empty range at offset {}", offset + received as u64);
            }
            let n = chunk.len().min(wanted - received);
            buf[received..received + n].copy_from_slice(&chunk[..n]);
            received += n;
            self.transferred_bytes.fetch_add(n as u64, Ordering::Relaxed);
        }

        Ok(received)
    }

    fn size(&self) -> u64 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive;
    use crate::verb::Part;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    /// How the loopback server answers.
    struct Canned {
        body: Vec<u8>,
        accept_ranges: bool,
        content_length: bool,
        /// Answer ranged GETs with 206; otherwise 200 and the whole body.
        partial: bool,
        /// Most bytes handed out per ranged GET.
        max_chunk: usize,
    }

    impl Canned {
        fn new(body: Vec<u8>) -> Self {
            Self {
                body,
                accept_ranges: true,
                content_length: true,
                partial: true,
                max_chunk: usize::MAX,
            }
        }
    }

    /// Serve `canned` on a loopback port. Returns the URL and a GET counter.
    fn serve(canned: Canned) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/DOC.lar", listener.local_addr().unwrap());
        let gets = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&gets);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                respond(&canned, &counter, stream);
            }
        });

        (url, gets)
    }

    fn respond(canned: &Canned, gets: &AtomicUsize, mut stream: TcpStream) {
        let Ok(clone) = stream.try_clone() else { return };
        let mut reader = BufReader::new(clone);

        let mut request_line = String::new();
        if reader.read_line(&mut request_line).is_err() {
            return;
        }
        let mut range: Option<(usize, usize)> = None;
        loop {
            let mut line = String::new();
            match reader.read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) if line == "\r\n" => break,
                Ok(_) => {}
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("range") {
                    range = value
                        .trim()
                        .strip_prefix("bytes=")
                        .and_then(|r| r.split_once('-'))
                        .and_then(|(a, b)| Some((a.parse().ok()?, b.parse().ok()?)));
                }
            }
        }

        let mut head = String::new();
        let mut payload: &[u8] = &[];
        if request_line.starts_with("HEAD") {
            head.push_str("HTTP/1.1 200 OK\r\n");
            if canned.accept_ranges {
                head.push_str("Accept-Ranges: bytes\r\n");
            }
            if canned.content_length {
                head.push_str(&format!("Content-Length: {}\r\n", canned.body.len()));
            }
        } else {
            gets.fetch_add(1, Ordering::SeqCst);
            match range {
                Some((first, last)) if canned.partial => {
                    let last = last
                        .min(canned.body.len() - 1)
                        .min(first.saturating_add(canned.max_chunk) - 1);
                    payload = &canned.body[first..=last];
                    head.push_str("HTTP/1.1 206 Partial Content\r\n");
                    head.push_str(&format!(
                        "Content-Range: bytes {first}-{last}/{}\r\n",
                        canned.body.len()
                    ));
                }
                _ => {
                    payload = &canned.body;
                    head.push_str("HTTP/1.1 200 OK\r\n");
                }
            }
            head.push_str(&format!("Content-Length: {}\r\n", payload.len()));
        }
        head.push_str("Connection: close\r\n\r\n");

        // the client may hang up early on responses it rejects
        stream.write_all(head.as_bytes()).ok();
        stream.write_all(payload).ok();
    }

    fn connect(url: &str) -> Result<HttpRangeReader> {
        let client = Client::builder().no_proxy().timeout(REQUEST_TIMEOUT).build()?;
        HttpRangeReader::with_client(client, url.to_string())
    }

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn reads_a_range() {
        let body = pattern(3000);
        let (url, gets) = serve(Canned::new(body.clone()));
        let reader = connect(&url).unwrap();
        assert_eq!(reader.size(), 3000);

        let mut buf = [0u8; 500];
        assert_eq!(reader.read_at(100, &mut buf).unwrap(), 500);
        assert_eq!(&buf[..], &body[100..600]);
        assert_eq!(reader.transferred_bytes(), 500);
        assert_eq!(gets.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn short_ranges_are_stitched_together() {
        let body = pattern(1000);
        let mut canned = Canned::new(body.clone());
        canned.max_chunk = 64;
        let (url, gets) = serve(canned);
        let reader = connect(&url).unwrap();

        let mut buf = [0u8; 300];
        assert_eq!(reader.read_at(10, &mut buf).unwrap(), 300);
        assert_eq!(&buf[..], &body[10..310]);
        assert_eq!(gets.load(Ordering::SeqCst), 5);
        assert_eq!(reader.transferred_bytes(), 300);
    }

    #[test]
    fn reads_are_clamped_to_the_end() {
        let body = pattern(100);
        let (url, gets) = serve(Canned::new(body.clone()));
        let reader = connect(&url).unwrap();

        let mut buf = [0u8; 10];
        assert_eq!(reader.read_at(100, &mut buf).unwrap(), 0);
        assert_eq!(reader.read_at(150, &mut buf).unwrap(), 0);
        assert_eq!(gets.load(Ordering::SeqCst), 0);

        assert_eq!(reader.read_at(97, &mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], &body[97..]);
    }

    #[test]
    fn server_without_range_support() {
        let mut canned = Canned::new(pattern(100));
        canned.accept_ranges = false;
        let (url, _) = serve(canned);

        let err = connect(&url).err().unwrap();
        assert!(err.to_string().contains("Range"), "{err:#}");
    }

    #[test]
    fn server_without_content_length() {
        let mut canned = Canned::new(pattern(100));
        canned.content_length = false;
        let (url, _) = serve(canned);

        let err = connect(&url).err().unwrap();
        assert!(err.to_string().contains("Content-Length"), "{err:#}");
    }

    #[test]
    fn whole_body_instead_of_range_is_an_error() {
        let mut canned = Canned::new(pattern(100));
        canned.partial = false;
        let (url, _) = serve(canned);
        let reader = connect(&url).unwrap();

        let err = reader.read_at(0, &mut [0u8; 10]).unwrap_err();
        assert!(err.to_string().contains("200"), "{err:#}");
    }

    #[test]
    fn remote_package() {
        let mut builder = tar::Builder::new(Vec::new());
        for (name, body) in [("DOC.info", &b"ABC"[..]), ("DOC.data", &b"body"[..])] {
            let mut header = tar::Header::new_gnu();
            header.set_size(body.len() as u64);
            header.set_mode(0o644);
            builder.append_data(&mut header, name, body).unwrap();
        }
        let (url, _) = serve(Canned::new(builder.into_inner().unwrap()));
        let reader = Arc::new(connect(&url).unwrap());

        let mut package = archive::open(Arc::clone(&reader)).unwrap();
        let mut entry = archive::locate(package.entries().unwrap(), Part::Data).unwrap();
        let mut body = String::new();
        entry.read_to_string(&mut body).unwrap();
        assert_eq!(body, "body");
        // the whole package, plus the compression sniff
        assert!(reader.transferred_bytes() >= reader.size());
    }
}
