//! Status page
//!
//! Plain HTML report served to anything that opens with `GET`, so the router
//! can be checked from a browser.

use std::fmt::Write;
use std::time::SystemTime;

use chrono::{DateTime, Local};

use crate::registry::PeerEntry;

const STYLE: &str = "\
* { font-family: sans-serif; }
body { background-color: #476A6F; }
table { margin: auto; }
table thead th { background-color: #7EBC89; padding: 0.5em; }
table tbody td { border: solid 0.2em #7EBC89; text-align: center; padding: 0.1em; }
table tbody tr:nth-child(odd) { background-color: #FAEDCA; }
table tbody tr:nth-child(even) { background-color: #F2C078; }
table tbody tr:hover { background-color: #C1DBB3; }";

/// Render a complete HTTP/1.1 response listing `peers`
pub fn render_status_page(peers: &[PeerEntry], now: SystemTime) -> String {
    let document = render_document(peers, now);
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\n\r\n{}",
        document.len(),
        document
    )
}

fn render_document(peers: &[PeerEntry], now: SystemTime) -> String {
    let mut rows = String::new();
    for peer in peers {
        let connected_at: DateTime<Local> = peer.connected_at.into();
        let minutes = peer.connected_for(now).as_secs_f64() / 60.0;
        // Writing to a String cannot fail
        let _ = writeln!(
            rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.3} min</td></tr>",
            peer.endpoint.ip(),
            peer.endpoint.port(),
            connected_at.format("%Y %B %d, %A %I:%M:%S %p %Z"),
            minutes
        );
    }

    format!(
        "<!DOCTYPE html>
<html>
<head>
<title>Peer to Peer Router - {count}</title>
<style>
{style}
</style>
</head>
<body>
<table>
<thead>
<tr><th>Client Address</th><th>Client Port</th><th>Client Time Stamp</th><th>Time Connected</th></tr>
</thead>
<tbody>
{rows}</tbody>
</table>
</body>
</html>
",
        count = peers.len(),
        style = STYLE,
        rows = rows
    )
}
