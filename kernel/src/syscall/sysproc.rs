use crate::proc::{fork, growproc, kill, myproc, sleep, wait, exit};
use crate::syscall::syscall::{argaddr, argint};
use crate::trap::{ticks, ticks_chan};
use crate::spinlock::Spinlock;

static mut SLEEP_LOCK: Spinlock = Spinlock::init_lock("sleep");

pub(crate) fn sys_fork() -> u64 {
    fork() as i64 as u64
}

pub(crate) fn sys_exit() -> u64 {
    let n = argint(0);
    exit(n);
}

pub(crate) fn sys_wait() -> u64 {
    let addr = argaddr(0);
    wait(addr) as i64 as u64
}

pub(crate) fn sys_getpid() -> u64 {
    myproc().pid as u64
}

pub(crate) fn sys_sbrk() -> u64 {
    let n = argint(0);
    let addr = myproc().sz;
    if growproc(n) < 0 {
        return u64::MAX;
    }
    addr as u64
}

pub(crate) fn sys_sleep() -> u64 {
    let n = argint(0);
    if n < 0 {
        return u64::MAX;
    }

    let ticks0 = ticks();
    let lk = unsafe { &mut SLEEP_LOCK };
    lk.acquire();
    while ticks().wrapping_sub(ticks0) < n as u32 {
        if myproc().killed() != 0 {
            lk.release();
            return u64::MAX;
        }
        sleep(ticks_chan(), lk);
    }
    lk.release();

    0
}

pub(crate) fn sys_kill() -> u64 {
    let pid = argint(0);
    kill(pid as u32) as i64 as u64
}

pub(crate) fn sys_uptime() -> u64 {
    ticks() as u64
}
