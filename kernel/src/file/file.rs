use log::warn;

use crate::error::KernelError;
use crate::file::FDType::{FD_DEVICE, FD_INODE, FD_NONE, FD_PIPE};
use crate::file::{DEVSW, File};
use crate::walog::{begin_op, end_op};
use crate::param::{MAXOPBLOCKS, NFILE};
use crate::spinlock::Spinlock;
use crate::stat::Stat;

struct FTable {
    lock: Spinlock,
    file: [File; NFILE]
}

static mut FTABLE: FTable = FTable {
    lock: Spinlock::init_lock("ftable"),
    file: [File::create(); NFILE],
};

pub fn fileinit() {
    // empty due to FTABLE has already been initialized
}

// Allocate a file structure.
pub fn filealloc() -> Option<&'static mut File> {
    unsafe {
        FTABLE.lock.acquire();
        for f in &mut FTABLE.file {
            if f.ref_cnt == 0 {
                f.ref_cnt = 1;
                FTABLE.lock.release();
                return Some(f);
            }
        }

        FTABLE.lock.release();
        warn!("filealloc: {:?}", KernelError::NoFile);
        return None;
    }
}

// Increment ref count for file f.
pub(crate) fn filedup(f: &mut File) -> *mut File {
    unsafe {
        FTABLE.lock.acquire();
        if f.ref_cnt < 1 {
            panic!("filedup")
        }

        f.ref_cnt += 1;
        FTABLE.lock.release();
    }
    f as *mut File
}

// Close file f.  (Decrement ref count, close when reaches 0.)
pub(crate) fn fileclose(f: &mut File) {
    unsafe {
        FTABLE.lock.acquire();
        if f.ref_cnt < 1 {
            panic!("fileclose");
        }

        f.ref_cnt -= 1;
        if f.ref_cnt > 0 {
            FTABLE.lock.release();
            return;
        }

        let file_type = f.file_type;
        let writable = f.writable;
        FTABLE.lock.release();

        if file_type == FD_PIPE {
            if let Some(pipe) = f.pipe.take() {
                (&mut *pipe).close(writable);
            }
        } else if file_type == FD_INODE || file_type == FD_DEVICE {
            begin_op();
            if let Some(ip) = f.ip.take() {
                (&mut *ip).iput();
            }
            end_op();
        }

        f.ref_cnt = 0;
        f.file_type = FD_NONE;
    }
}

// Get metadata about file f.
// addr is a user virtual address, pointing to a struct stat.
pub(crate) fn filestat(f: &mut File, user_dst: usize) -> i32 {
    use crate::vm::copyout;

    let p = crate::proc::myproc();
    match f.file_type {
        FD_INODE | FD_DEVICE => {
            let ip = f.ip_mut();
            ip.ilock();
            let mut st = Stat { dev: 0, ino: 0, file_type: crate::stat::FileType::NO_TYPE, nlink: 0, size: 0 };
            ip.stati(&mut st);
            ip.iunlock();
            let bytes = unsafe {
                core::slice::from_raw_parts(&st as *const Stat as *const u8, core::mem::size_of::<Stat>())
            };
            if copyout(p.pagetable_mut(), user_dst, bytes.as_ptr(), bytes.len()) < 0 {
                return -1;
            }
            0
        }
        _ => -1,
    }
}

// Read from file f.
pub(crate) fn fileread(f: &mut File, addr: usize, n: usize) -> i32 {
    if !f.readable {
        return -1;
    }

    match f.file_type {
        FD_PIPE => f.pipe_mut().read(true, addr, n),
        FD_DEVICE => {
            if f.major < 0 || f.major as usize >= crate::param::NDEV {
                return -1;
            }
            unsafe {
                match DEVSW[f.major as usize] {
                    Some(dev) => (*dev).read(true, addr, n),
                    None => -1,
                }
            }
        }
        FD_INODE => {
            let ip = f.ip_mut();
            ip.ilock();
            let r = ip.readi(true, addr as *mut u8, f.off, n);
            if r > 0 {
                f.off += r as u32;
            }
            ip.iunlock();
            r as i32
        }
        _ => panic!("fileread"),
    }
}

// Write to file f.
pub(crate) fn filewrite(f: &mut File, addr: usize, n: usize) -> i32 {
    if !f.writable {
        return -1;
    }

    match f.file_type {
        FD_PIPE => f.pipe_mut().write(true, addr, n),
        FD_DEVICE => {
            if f.major < 0 || f.major as usize >= crate::param::NDEV {
                return -1;
            }
            unsafe {
                match DEVSW[f.major as usize] {
                    Some(dev) => (*dev).write(true, addr, n),
                    None => -1,
                }
            }
        }
        FD_INODE => {
            // write a few blocks at a time to avoid exceeding
            // the maximum log transaction size, including
            // i-node, indirect block, allocation blocks,
            // and 2 blocks of slop for non-aligned writes.
            let max = ((MAXOPBLOCKS - 1 - 1 - 2) / 2) * crate::fs::BSIZE;
            let mut i = 0;
            let mut ret = 0;
            while i < n {
                let mut n1 = n - i;
                if n1 > max {
                    n1 = max;
                }

                begin_op();
                let ip = f.ip_mut();
                ip.ilock();
                let r = ip.writei(true, (addr + i) as *mut u8, f.off, n1);
                if r > 0 {
                    f.off += r as u32;
                }
                ip.iunlock();
                end_op();

                if r != n1 as isize {
                    break;
                }
                i += r as usize;
                ret = i;
            }
            if i == n { n as i32 } else { ret as i32 }
        }
        _ => panic!("filewrite"),
    }
}
