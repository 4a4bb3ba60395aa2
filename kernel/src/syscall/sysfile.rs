// File-system-related system calls.

use core::mem;

use crate::exec::exec;
use crate::file::fcntl::{O_CREATE, O_RDONLY, O_RDWR, O_TRUNC, O_WRONLY};
use crate::file::file::{filealloc, fileclose, filedup, fileread, filestat, filewrite};
use crate::file::{File, INode};
use crate::file::FDType::{FD_DEVICE, FD_INODE};
use crate::fs::fs::{dirlink, dirlookup, dirunlink, ialloc, isdirempty, namei, nameiparent};
use crate::kalloc::KMEM;
use crate::param::{MAXARG, MAXPATH, NDEV, NOFILE};
use crate::pipe::pipealloc;
use crate::proc::myproc;
use crate::riscv::PGSIZE;
use crate::stat::FileType;
use crate::stat::FileType::{T_DEVICE, T_DIR, T_FILE};
use crate::vm::copyout;
use crate::walog::{begin_op, end_op};
use crate::syscall::syscall::{argaddr, argint, argstr, fetchaddr, fetchstr};

// Fetch the nth word-sized syscall argument as a file descriptor
// and return both the descriptor number and the open file it names.
fn argfd(n: u8) -> Option<(usize, &'static mut File)> {
    let fd = argint(n);
    if fd < 0 || fd as usize >= NOFILE {
        return None;
    }
    let fd = fd as usize;
    let f = myproc().ofile[fd]?;
    Some((fd, unsafe { &mut *f }))
}

// Allocate a file descriptor for the given file.
// Takes over file reference from caller on success.
fn fdalloc(f: *mut File) -> Option<usize> {
    let p = myproc();

    for fd in 0..NOFILE {
        if p.ofile[fd].is_none() {
            p.ofile[fd] = Some(f);
            return Some(fd);
        }
    }

    None
}

pub(crate) fn sys_dup() -> u64 {
    let (_fd, f) = match argfd(0) {
        Some(x) => x,
        None => return u64::MAX,
    };

    match fdalloc(filedup(f)) {
        Some(fd) => fd as u64,
        None => u64::MAX,
    }
}

pub(crate) fn sys_read() -> u64 {
    let (_fd, f) = match argfd(0) {
        Some(x) => x,
        None => return u64::MAX,
    };
    let addr = argaddr(1);
    let n = argint(2);
    if n < 0 {
        return u64::MAX;
    }
    fileread(f, addr, n as usize) as i64 as u64
}

pub(crate) fn sys_write() -> u64 {
    let (_fd, f) = match argfd(0) {
        Some(x) => x,
        None => return u64::MAX,
    };
    let addr = argaddr(1);
    let n = argint(2);
    if n < 0 {
        return u64::MAX;
    }
    filewrite(f, addr, n as usize) as i64 as u64
}

pub(crate) fn sys_close() -> u64 {
    let (fd, f) = match argfd(0) {
        Some(x) => x,
        None => return u64::MAX,
    };
    myproc().ofile[fd] = None;
    fileclose(f);
    0
}

pub(crate) fn sys_fstat() -> u64 {
    let (_fd, f) = match argfd(0) {
        Some(x) => x,
        None => return u64::MAX,
    };
    let st = argaddr(1);
    filestat(f, st) as i64 as u64
}

// Create the path new as a link to the same inode as old.
pub(crate) fn sys_link() -> u64 {
    let mut new: [u8; MAXPATH] = [0; MAXPATH];
    let mut old: [u8; MAXPATH] = [0; MAXPATH];
    if argstr(0, &mut old as *mut u8, MAXPATH) < 0 || argstr(1, &mut new as *mut u8, MAXPATH) < 0 {
        return u64::MAX;
    }

    begin_op();

    let ip = match namei(&old) {
        Some(ip) => ip,
        None => {
            end_op();
            return u64::MAX;
        }
    };

    ip.ilock();
    if ip.file_type == T_DIR {
        ip.iunlockput();
        end_op();
        return u64::MAX;
    }

    ip.nlink += 1;
    ip.iupdate();
    ip.iunlock();

    let (dp, name) = nameiparent(&new);
    if let Some(dp) = dp {
        dp.ilock();
        let same_dev = dp.dev == ip.dev;
        let linked = same_dev && dirlink(dp, name, ip.inum as u16).is_some();
        dp.iunlockput();
        if linked {
            ip.iput();
            end_op();
            return 0;
        }
    }

    ip.ilock();
    ip.nlink -= 1;
    ip.iupdate();
    ip.iunlockput();
    end_op();
    u64::MAX
}

// Remove a directory entry, and if that was the inode's last link,
// free the inode and its content.
pub(crate) fn sys_unlink() -> u64 {
    let mut path: [u8; MAXPATH] = [0; MAXPATH];
    if argstr(0, &mut path as *mut u8, MAXPATH) < 0 {
        return u64::MAX;
    }

    begin_op();

    let (dp, name) = nameiparent(&path);
    let dp = match dp {
        Some(dp) => dp,
        None => {
            end_op();
            return u64::MAX;
        }
    };

    dp.ilock();

    if name == b"." || name == b".." {
        dp.iunlockput();
        end_op();
        return u64::MAX;
    }

    let mut off: u32 = 0;
    let ip = match dirlookup(dp, name, &mut off) {
        Some(ip) => ip,
        None => {
            dp.iunlockput();
            end_op();
            return u64::MAX;
        }
    };

    ip.ilock();
    if ip.nlink < 1 {
        panic!("unlink: nlink < 1");
    }
    if ip.file_type == T_DIR && !isdirempty(ip) {
        ip.iunlockput();
        dp.iunlockput();
        end_op();
        return u64::MAX;
    }

    if !dirunlink(dp, off) {
        panic!("unlink: dirunlink");
    }

    if ip.file_type == T_DIR {
        dp.nlink -= 1;
        dp.iupdate();
    }
    dp.iunlockput();

    ip.nlink -= 1;
    ip.iupdate();
    ip.iunlockput();

    end_op();
    0
}

fn create<'a>(path: &[u8], file_type: FileType, major: i16, minor: i16) -> Option<&'a mut INode> {
    let (dp, name) = nameiparent(path);
    let dp = dp?;
    dp.ilock();

    let mut off = 0;
    if let Some(ip) = dirlookup(dp, name, &mut off) {
        dp.iunlockput();
        ip.ilock();
        if file_type == T_FILE && (ip.file_type == T_FILE || ip.file_type == T_DEVICE) {
            return Some(ip);
        }
        ip.iunlockput();
        return None;
    }

    let ip = ialloc(dp.dev, file_type);
    if ip.is_none() {
        dp.iunlockput();
        return None;
    }

    let ip = ip?;
    ip.ilock();
    ip.major = major;
    ip.minor = minor;
    ip.nlink = 1;
    ip.iupdate();

    if file_type == T_DIR {
        // No ip.nlink += 1 for ".": avoid cyclic ref count.
        if dirlink(ip, b".", ip.inum as u16).is_none() || dirlink(ip, b"..", dp.inum as u16).is_none() {
            ip.nlink = 0;
            ip.iupdate();
            ip.iunlockput();
            dp.iunlockput();
            return None;
        }
    }

    if dirlink(dp, name, ip.inum as u16).is_none() {
        ip.nlink = 0;
        ip.iupdate();
        ip.iunlockput();
        dp.iunlockput();
        return None;
    }

    if file_type == T_DIR {
        // now that success is guaranteed:
        dp.nlink += 1; // for ".."
        dp.iupdate();
    }

    dp.iunlockput();

    Some(ip)
}

pub(crate) fn sys_open() -> u64 {
    let mut path: [u8; MAXPATH] = [0; MAXPATH];
    let omode = argint(1);
    if argstr(0, &mut path as *mut u8, MAXPATH) < 0 {
        return u64::MAX;
    }

    begin_op();

    let ip;
    if omode & O_CREATE != 0 {
        match create(&path, T_FILE, 0, 0) {
            Some(i) => ip = i,
            None => {
                end_op();
                return u64::MAX;
            }
        }
    } else {
        let found = match namei(&path) {
            Some(i) => i,
            None => {
                end_op();
                return u64::MAX;
            }
        };

        found.ilock();
        if found.file_type == T_DIR && omode != O_RDONLY {
            found.iunlockput();
            end_op();
            return u64::MAX;
        }
        ip = found;
    }

    if ip.file_type == T_DEVICE && (ip.major < 0 || ip.major as usize >= NDEV) {
        ip.iunlockput();
        end_op();
        return u64::MAX;
    }

    let f = match filealloc() {
        Some(f) => f,
        None => {
            ip.iunlockput();
            end_op();
            return u64::MAX;
        }
    };

    let fd = match fdalloc(f as *mut File) {
        Some(fd) => fd,
        None => {
            fileclose(f);
            ip.iunlockput();
            end_op();
            return u64::MAX;
        }
    };

    if ip.file_type == T_DEVICE {
        f.file_type = FD_DEVICE;
        f.major = ip.major;
    } else {
        f.file_type = FD_INODE;
        f.off = 0;
    }
    f.ip = Some(ip as *mut INode);
    f.readable = omode & O_WRONLY == 0;
    f.writable = (omode & O_WRONLY) != 0 || (omode & O_RDWR) != 0;

    if (omode & O_TRUNC) != 0 && ip.file_type == T_FILE {
        ip.itrunc();
    }

    ip.iunlock();
    end_op();

    fd as u64
}

pub(crate) fn sys_mkdir() -> u64 {
    begin_op();
    let mut path: [u8; MAXPATH] = [0; MAXPATH];
    if argstr(0, &mut path as *mut u8, MAXPATH) < 0 || create(&path, T_DIR, 0, 0).is_none() {
        end_op();
        return u64::MAX;
    }
    end_op();
    0
}

pub(crate) fn sys_mknod() -> u64 {
    begin_op();
    let major = argint(1) as i16;
    let minor = argint(2) as i16;

    let mut path = [0; MAXPATH];
    if argstr(0, &mut path as *mut u8, MAXPATH) < 0 {
        end_op();
        return u64::MAX;
    }

    let ip = create(&path, T_DEVICE, major, minor);
    if ip.is_none() {
        end_op();
        return u64::MAX;
    }

    ip.unwrap().iunlockput();
    end_op();
    0
}

pub(crate) fn sys_chdir() -> u64 {
    let p = myproc();
    let mut path: [u8; MAXPATH] = [0; MAXPATH];
    if argstr(0, &mut path as *mut u8, MAXPATH) < 0 {
        return u64::MAX;
    }

    begin_op();

    let ip = match namei(&path) {
        Some(ip) => ip,
        None => {
            end_op();
            return u64::MAX;
        }
    };

    ip.ilock();
    if ip.file_type != T_DIR {
        ip.iunlockput();
        end_op();
        return u64::MAX;
    }
    ip.iunlock();

    if let Some(cwd) = p.cwd.take() {
        unsafe { &mut *cwd }.iput();
    }
    end_op();

    p.cwd = Some(ip as *mut INode);
    0
}

pub(crate) fn sys_pipe() -> u64 {
    let fdarray = argaddr(0);
    let p = myproc();

    let (rf, wf) = match pipealloc() {
        Some(pair) => pair,
        None => return u64::MAX,
    };

    let fd0 = match fdalloc(rf as *mut File) {
        Some(fd) => fd,
        None => {
            fileclose(rf);
            fileclose(wf);
            return u64::MAX;
        }
    };
    let fd1 = match fdalloc(wf as *mut File) {
        Some(fd) => fd,
        None => {
            p.ofile[fd0] = None;
            fileclose(rf);
            fileclose(wf);
            return u64::MAX;
        }
    };

    let fds = [fd0 as i32, fd1 as i32];
    let bytes = unsafe {
        core::slice::from_raw_parts(fds.as_ptr() as *const u8, mem::size_of_val(&fds))
    };
    if copyout(p.pagetable_mut(), fdarray, bytes.as_ptr(), bytes.len()) < 0 {
        p.ofile[fd0] = None;
        p.ofile[fd1] = None;
        fileclose(rf);
        fileclose(wf);
        return u64::MAX;
    }

    0
}

pub(crate) fn sys_exec() -> u64 {
    let mut uarg: usize = 0;
    let uargv = argaddr(1);

    let mut path: [u8; MAXPATH] = [0; MAXPATH];
    if argstr(0, &mut path as *mut u8, MAXPATH) < 0 {
        return u64::MAX;
    }

    let mut argv: [Option<*mut u8>; MAXARG] = [None; MAXARG];
    let mut i = 0;
    let mut bad = false;
    loop {
        if i >= argv.len() {
            bad = true;
            break;
        }

        if fetchaddr(uargv + mem::size_of::<usize>() * i, &mut uarg) < 0 {
            bad = true;
            break;
        }

        if uarg == 0 {
            argv[i] = None;
            break;
        }

        let ptr: *mut u8 = unsafe { KMEM.kalloc() };
        if ptr.is_null() {
            bad = true;
            break;
        }
        argv[i] = Some(ptr);

        if fetchstr(uarg, argv[i].unwrap(), PGSIZE) < 0 {
            bad = true;
            break;
        }

        i += 1;
    }

    let ret = if !bad { exec(&path, &argv) } else { -1 };

    for slot in argv.iter() {
        match slot {
            Some(p) => unsafe { KMEM.kfree(*p) },
            None => break,
        }
    }

    ret as i64 as u64
}
