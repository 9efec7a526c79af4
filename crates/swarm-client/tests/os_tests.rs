#![cfg(unix)]

use swarm_client::os::raise_nofile_limit;

#[test]
fn test_soft_limit_raised_to_hard_limit() {
    let applied = raise_nofile_limit().unwrap().unwrap();

    let mut lim = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    // SAFETY: getrlimit only writes into `lim`.
    let rc = unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut lim) };
    assert_eq!(rc, 0);
    assert_eq!(applied, lim.rlim_cur);
    assert_eq!(lim.rlim_cur, lim.rlim_max);

    // Already at the ceiling: a second call is a no-op with the same value.
    assert_eq!(raise_nofile_limit().unwrap(), Some(applied));
}
