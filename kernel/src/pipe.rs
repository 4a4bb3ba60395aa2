use crate::file::file::filealloc;
use crate::file::FDType::FD_PIPE;
use crate::file::File;
use crate::kalloc::KMEM;
use crate::proc::{either_copyin, either_copyout, myproc, sleep, wakeup};
use crate::spinlock::Spinlock;

const PIPESIZE: usize = 512;
pub struct Pipe {
    lock: Spinlock,
    data: [u8; PIPESIZE],
    nread: u32, // number of bytes read
    nwrite: u32, // number of bytes written
    readopen: bool, // read fd is still open
    writeopen: bool, // write fd is still open
}

impl Pipe {
    const fn create() -> Self {
        Pipe {
            lock: Spinlock::init_lock("pipe"),
            data: [0; PIPESIZE],
            nread: 0,
            nwrite: 0,
            readopen: true,
            writeopen: true,
        }
    }

    pub(crate) fn close(self: &mut Self, writable: bool) {
        self.lock.acquire();
        if writable {
            self.writeopen = false;
            wakeup(&self.nread as *const u32 as *const u8);
        } else {
            self.readopen = false;
            wakeup(&self.nwrite as *const u32 as *const u8);
        }
        if !self.readopen && !self.writeopen {
            self.lock.release();
            unsafe { KMEM.kfree(self as *mut Pipe); }
        } else {
            self.lock.release();
        }
    }

    // Write n bytes from addr (user or kernel, depending on user_src)
    // into the pipe. Returns the number of bytes written, or -1 on error.
    pub(crate) fn write(self: &mut Self, is_user_src: bool, addr: usize, n: usize) -> i32 {
        let mut i = 0;
        self.lock.acquire();
        while i < n {
            if !self.readopen || myproc().killed() != 0 {
                self.lock.release();
                return -1;
            }

            if self.nwrite == self.nread.wrapping_add(PIPESIZE as u32) {
                // full: wake reader, wait for room.
                wakeup(&self.nread as *const u32 as *const u8);
                sleep(&self.nwrite as *const u32 as *const u8, &mut self.lock);
            } else {
                let mut ch: u8 = 0;
                if either_copyin(&mut ch as *mut u8, is_user_src, addr + i, 1) == -1 {
                    break;
                }
                let idx = (self.nwrite as usize) % PIPESIZE;
                self.data[idx] = ch;
                self.nwrite = self.nwrite.wrapping_add(1);
                i += 1;
            }
        }
        wakeup(&self.nread as *const u32 as *const u8);
        self.lock.release();

        i as i32
    }

    // Read up to n bytes out of the pipe into addr (user or kernel,
    // depending on user_dst). Returns the number of bytes read.
    pub(crate) fn read(self: &mut Self, is_user_dst: bool, addr: usize, n: usize) -> i32 {
        self.lock.acquire();
        while self.nread == self.nwrite && self.writeopen {
            if myproc().killed() != 0 {
                self.lock.release();
                return -1;
            }
            sleep(&self.nread as *const u32 as *const u8, &mut self.lock);
        }

        let mut i = 0;
        while i < n {
            if self.nread == self.nwrite {
                break;
            }
            let ch = self.data[(self.nread as usize) % PIPESIZE];
            self.nread = self.nread.wrapping_add(1);
            if either_copyout(is_user_dst, addr + i, &ch as *const u8, 1) == -1 {
                break;
            }
            i += 1;
        }
        wakeup(&self.nwrite as *const u32 as *const u8);
        self.lock.release();

        i as i32
    }
}

// Allocate a pipe: a fresh kernel page holding the ring buffer,
// wired up as a read/write pair of File objects.
pub(crate) fn pipealloc<'a>() -> Option<(&'a mut File, &'a mut File)> {
    let pipe_ptr: *mut Pipe = unsafe { KMEM.kalloc() as *mut Pipe };
    if pipe_ptr.is_null() {
        return None;
    }
    unsafe { *pipe_ptr = Pipe::create(); }

    let rf = filealloc();
    let wf = filealloc();
    if rf.is_none() || wf.is_none() {
        if let Some(f) = rf { f.ref_cnt = 0; }
        if let Some(f) = wf { f.ref_cnt = 0; }
        unsafe { KMEM.kfree(pipe_ptr); }
        return None;
    }

    let rf = rf.unwrap();
    rf.file_type = FD_PIPE;
    rf.readable = true;
    rf.writable = false;
    rf.pipe = Some(unsafe { pipe_ptr.as_mut().unwrap() });

    let wf = wf.unwrap();
    wf.file_type = FD_PIPE;
    wf.readable = false;
    wf.writable = true;
    wf.pipe = Some(unsafe { pipe_ptr.as_mut().unwrap() });

    Some((rf, wf))
}
