use std::io;
use tracing::info;

#[cfg(unix)]
pub use libc::rlim_t;

#[cfg(not(unix))]
#[allow(non_camel_case_types)]
pub type rlim_t = u64;

/// Raises the open-file soft limit to the hard limit, since every live flow
/// holds a socket. Returns the soft limit now in effect.
#[cfg(unix)]
pub fn raise_nofile_limit() -> io::Result<Option<rlim_t>> {
    use std::mem;

    // SAFETY: rlimit is plain data and both calls only read/write `lim`.
    unsafe {
        let mut lim: libc::rlimit = mem::zeroed();
        if libc::getrlimit(libc::RLIMIT_NOFILE, &mut lim) != 0 {
            return Err(io::Error::last_os_error());
        }

        let previous = lim.rlim_cur;
        if previous == lim.rlim_max {
            info!("ulimit: soft limit already at hard limit ({previous})");
            return Ok(Some(previous));
        }

        lim.rlim_cur = lim.rlim_max;
        if libc::setrlimit(libc::RLIMIT_NOFILE, &lim) != 0 {
            return Err(io::Error::last_os_error());
        }
        info!(
            "ulimit: raised open file soft limit to {}; previous value = {previous}",
            lim.rlim_cur
        );
        Ok(Some(lim.rlim_cur))
    }
}

#[cfg(not(unix))]
pub fn raise_nofile_limit() -> io::Result<Option<rlim_t>> {
    info!("ulimit: not supported on this platform, leaving limits untouched");
    Ok(None)
}
