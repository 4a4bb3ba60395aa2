// Behavioral error taxonomy (see spec §7). Most internal fallible paths
// return `Result<T, KernelError>`; the syscall boundary collapses every
// variant to -1, exactly as the legacy sentinel convention did.

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KernelError {
    NoFrames,
    NoProc,
    NoInode,
    NoFile,
    NoBuf,
    BadPath,
    BadFd,
    Fault,
    TooBig,
    CorruptFs,
}

impl KernelError {
    pub const fn as_retval(self) -> i64 {
        -1
    }
}

pub type KResult<T> = Result<T, KernelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_collapses_to_the_legacy_sentinel() {
        let variants = [
            KernelError::NoFrames,
            KernelError::NoProc,
            KernelError::NoInode,
            KernelError::NoFile,
            KernelError::NoBuf,
            KernelError::BadPath,
            KernelError::BadFd,
            KernelError::Fault,
            KernelError::TooBig,
            KernelError::CorruptFs,
        ];
        for v in variants {
            assert_eq!(v.as_retval(), -1);
        }
    }
}
