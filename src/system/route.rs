//! IPv4 routing table access and default-route selection.
//!
//! Each platform backend produces a flat list of [`RouteEntry`] rows:
//!   - Linux: `/proc/net/route`
//!   - Windows: `GetIpForwardTable` / `GetIfEntry` from iphlpapi.dll
//!   - macOS / BSD: `route -n get default`
//!
//! Selection of the default route is platform independent.

use std::io;
use std::net::Ipv4Addr;
use std::path::Path;

use tracing::{debug, trace};

use super::SystemInfo;

const RTF_UP: u32 = 0x0001;

/// One row of the IPv4 routing table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub interface: String,
    pub destination: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub mask: Ipv4Addr,
    pub metric: u32,
    pub up: bool,
}

impl RouteEntry {
    /// A default route matches every destination: 0.0.0.0/0
    pub fn is_default(&self) -> bool {
        self.up && self.destination.is_unspecified() && self.mask.is_unspecified()
    }
}

/// Pick the default route with the lowest metric. Ties keep table order.
pub fn default_route(routes: &[RouteEntry]) -> Option<&RouteEntry> {
    routes
        .iter()
        .filter(|r| r.is_default())
        .fold(None, |best: Option<&RouteEntry>, r| match best {
            Some(b) if b.metric <= r.metric => Some(b),
            _ => Some(r),
        })
}

/// Name of the interface carrying the default IPv4 route, or `None` when the
/// host has no default route (offline, or the table could not be read).
pub fn resolve_default_interface<P: SystemInfo + ?Sized>(provider: &P) -> Option<String> {
    let routes = match provider.routes() {
        Ok(routes) => routes,
        Err(e) => {
            debug!("routing table unavailable: {}", e);
            return None;
        }
    };
    trace!(entries = routes.len(), "read routing table");

    let iface = default_route(&routes).map(|r| r.interface.clone());
    if iface.is_none() {
        debug!("no default IPv4 route");
    }
    iface
}

// ─── Linux ───────────────────────────────────────────────────────────────────

/// Parse the contents of `/proc/net/route`.
///
/// Addresses are hex-encoded in host (little-endian) byte order. Malformed
/// rows are skipped.
pub fn parse_proc_net_route(content: &str) -> Vec<RouteEntry> {
    content
        .lines()
        .skip(1) // header
        .filter_map(parse_proc_route_line)
        .collect()
}

fn parse_proc_route_line(line: &str) -> Option<RouteEntry> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 8 {
        return None;
    }

    let flags = u32::from_str_radix(fields[3], 16).ok()?;
    Some(RouteEntry {
        interface: fields[0].to_string(),
        destination: hex_le_addr(fields[1])?,
        gateway: hex_le_addr(fields[2])?,
        metric: fields[6].parse().ok()?,
        mask: hex_le_addr(fields[7])?,
        up: flags & RTF_UP != 0,
    })
}

fn hex_le_addr(s: &str) -> Option<Ipv4Addr> {
    let raw = u32::from_str_radix(s, 16).ok()?;
    Some(Ipv4Addr::from(raw.to_le_bytes()))
}

// ─── macOS / BSD ─────────────────────────────────────────────────────────────

/// Parse the output of `route -n get default`.
///
/// The command prints only the route it would use, so the result is either a
/// single default entry or nothing.
pub fn parse_route_get(output: &str) -> Vec<RouteEntry> {
    let mut interface = None;
    let mut gateway = Ipv4Addr::UNSPECIFIED;

    for line in output.lines() {
        if let Some((key, value)) = line.trim().split_once(':') {
            match key.trim() {
                "interface" => interface = Some(value.trim().to_string()),
                "gateway" => gateway = value.trim().parse().unwrap_or(Ipv4Addr::UNSPECIFIED),
                _ => {}
            }
        }
    }

    match interface {
        Some(interface) if !interface.is_empty() => vec![RouteEntry {
            interface,
            destination: Ipv4Addr::UNSPECIFIED,
            gateway,
            mask: Ipv4Addr::UNSPECIFIED,
            metric: 0,
            up: true,
        }],
        _ => Vec::new(),
    }
}

// ─── Platform dispatch ───────────────────────────────────────────────────────

/// Read the IPv4 routing table of the running host.
#[cfg(target_os = "linux")]
pub fn os_routes(procfs_root: &Path) -> io::Result<Vec<RouteEntry>> {
    let content = std::fs::read_to_string(procfs_root.join("net").join("route"))?;
    Ok(parse_proc_net_route(&content))
}

#[cfg(windows)]
pub fn os_routes(_procfs_root: &Path) -> io::Result<Vec<RouteEntry>> {
    win::fetch_routes()
}

#[cfg(any(
    target_os = "macos",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd"
))]
pub fn os_routes(_procfs_root: &Path) -> io::Result<Vec<RouteEntry>> {
    let output = std::process::Command::new("route")
        .args(["-n", "get", "default"])
        .output()?;
    // Exit status is non-zero when there is no default route
    if !output.status.success() {
        return Ok(Vec::new());
    }
    Ok(parse_route_get(&String::from_utf8_lossy(&output.stdout)))
}

#[cfg(not(any(
    target_os = "linux",
    windows,
    target_os = "macos",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd"
)))]
pub fn os_routes(_procfs_root: &Path) -> io::Result<Vec<RouteEntry>> {
    Ok(Vec::new())
}

// ─── Win32 sized-table query ─────────────────────────────────────────────────

#[cfg_attr(not(windows), allow(dead_code))]
const NO_ERROR: u32 = 0;
#[cfg_attr(not(windows), allow(dead_code))]
const ERROR_INSUFFICIENT_BUFFER: u32 = 122;
#[cfg_attr(not(windows), allow(dead_code))]
const FILL_ATTEMPTS: usize = 3;

/// Run a Win32 "probe the size, then fill" table query.
///
/// The table can grow between the probe and the fill; a fill that fails with
/// `ERROR_INSUFFICIENT_BUFFER` is retried with the size the call reported.
/// Returns `None` for an empty table. The buffer is `u32`-backed so table
/// rows read from it are aligned.
#[cfg_attr(not(windows), allow(dead_code))]
fn fill_sized_table<F>(mut query: F) -> io::Result<Option<Vec<u32>>>
where
    F: FnMut(*mut u8, &mut u32) -> u32,
{
    let mut size: u32 = 0;
    query(std::ptr::null_mut(), &mut size);

    for _ in 0..FILL_ATTEMPTS {
        if size == 0 {
            return Ok(None);
        }
        let mut buf = vec![0u32; (size as usize + 3) / 4];
        match query(buf.as_mut_ptr() as *mut u8, &mut size) {
            NO_ERROR => return Ok(Some(buf)),
            ERROR_INSUFFICIENT_BUFFER => {
                debug!(size, "table grew between size probe and fill, retrying");
            }
            err => return Err(io::Error::from_raw_os_error(err as i32)),
        }
    }
    Err(io::Error::from_raw_os_error(ERROR_INSUFFICIENT_BUFFER as i32))
}

// ─── Windows FFI ─────────────────────────────────────────────────────────────

#[cfg(windows)]
mod win {
    use std::io;
    use std::net::Ipv4Addr;

    use super::{fill_sized_table, RouteEntry, NO_ERROR};

    const MAX_INTERFACE_NAME_LEN: usize = 256;
    const MAXLEN_PHYSADDR: usize = 8;
    const MAXLEN_IFDESCR: usize = 256;

    #[repr(C)]
    #[allow(non_snake_case, non_camel_case_types)]
    struct MIB_IPFORWARDROW {
        dwForwardDest: u32,
        dwForwardMask: u32,
        dwForwardPolicy: u32,
        dwForwardNextHop: u32,
        dwForwardIfIndex: u32,
        dwForwardType: u32,
        dwForwardProto: u32,
        dwForwardAge: u32,
        dwForwardNextHopAS: u32,
        dwForwardMetric1: u32,
        dwForwardMetric2: u32,
        dwForwardMetric3: u32,
        dwForwardMetric4: u32,
        dwForwardMetric5: u32,
    }

    #[repr(C)]
    #[allow(non_snake_case, non_camel_case_types)]
    struct MIB_IPFORWARDTABLE {
        dwNumEntries: u32,
        table: [MIB_IPFORWARDROW; 1],
    }

    #[repr(C)]
    #[allow(non_snake_case, non_camel_case_types)]
    struct MIB_IFROW {
        wszName: [u16; MAX_INTERFACE_NAME_LEN],
        dwIndex: u32,
        dwType: u32,
        dwMtu: u32,
        dwSpeed: u32,
        dwPhysAddrLen: u32,
        bPhysAddr: [u8; MAXLEN_PHYSADDR],
        dwAdminStatus: u32,
        dwOperStatus: u32,
        dwLastChange: u32,
        dwInOctets: u32,
        dwInUcastPkts: u32,
        dwInNUcastPkts: u32,
        dwInDiscards: u32,
        dwInErrors: u32,
        dwInUnknownProtos: u32,
        dwOutOctets: u32,
        dwOutUcastPkts: u32,
        dwOutNUcastPkts: u32,
        dwOutDiscards: u32,
        dwOutErrors: u32,
        dwOutQLen: u32,
        dwDescrLen: u32,
        bDescr: [u8; MAXLEN_IFDESCR],
    }

    #[link(name = "iphlpapi")]
    extern "system" {
        fn GetIpForwardTable(pIpForwardTable: *mut u8, pdwSize: *mut u32, bOrder: i32) -> u32;
        fn GetIfEntry(pIfRow: *mut MIB_IFROW) -> u32;
    }

    pub fn fetch_routes() -> io::Result<Vec<RouteEntry>> {
        let buf = match fill_sized_table(|ptr, size| unsafe { GetIpForwardTable(ptr, size, 0) })? {
            Some(buf) => buf,
            None => return Ok(Vec::new()),
        };

        unsafe {
            let table = &*(buf.as_ptr() as *const MIB_IPFORWARDTABLE);
            let rows = std::slice::from_raw_parts(table.table.as_ptr(), table.dwNumEntries as usize);

            Ok(rows
                .iter()
                .map(|row| RouteEntry {
                    interface: interface_description(row.dwForwardIfIndex),
                    destination: Ipv4Addr::from(row.dwForwardDest.to_ne_bytes()),
                    gateway: Ipv4Addr::from(row.dwForwardNextHop.to_ne_bytes()),
                    mask: Ipv4Addr::from(row.dwForwardMask.to_ne_bytes()),
                    metric: row.dwForwardMetric1,
                    // The forward table only lists usable routes
                    up: true,
                })
                .collect())
        }
    }

    /// Adapter description ("Intel(R) Wireless-AC 9560") for an interface index.
    /// Falls back to `if<index>` when the lookup fails.
    fn interface_description(index: u32) -> String {
        unsafe {
            let mut row: MIB_IFROW = std::mem::zeroed();
            row.dwIndex = index;
            if GetIfEntry(&mut row) != NO_ERROR {
                return format!("if{}", index);
            }
            let len = (row.dwDescrLen as usize).min(MAXLEN_IFDESCR);
            let descr = &row.bDescr[..len];
            let descr = match descr.iter().position(|&b| b == 0) {
                Some(nul) => &descr[..nul],
                None => descr,
            };
            let name = String::from_utf8_lossy(descr).trim().to_string();
            if name.is_empty() {
                format!("if{}", index)
            } else {
                name
            }
        }
    }
}
