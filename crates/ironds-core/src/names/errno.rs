//! System error (errno) names.

use std::borrow::Cow;

use super::name_or_fallback;

/// Name of an errno value, or `None` if the host doesn't define it.
pub fn lookup_errno(error: i32) -> Option<&'static str>
{
    if let Some(name) = lookup_posix_errno(error) {
        return Some(name);
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(name) = lookup_linux_errno(error) {
            return Some(name);
        }
    }

    None
}

/// Name of an errno value.
///
/// Unknown values yield `"unknown error <n>"`.
pub fn errno_name(error: i32) -> Cow<'static, str>
{
    name_or_fallback(lookup_errno(error), "unknown error", error)
}

fn lookup_posix_errno(error: i32) -> Option<&'static str>
{
    let name = match error {
        libc::E2BIG => "E2BIG",
        libc::EACCES => "EACCES",
        libc::EADDRINUSE => "EADDRINUSE",
        libc::EADDRNOTAVAIL => "EADDRNOTAVAIL",
        libc::EAFNOSUPPORT => "EAFNOSUPPORT",
        libc::EAGAIN => "EAGAIN",
        libc::EALREADY => "EALREADY",
        libc::EBADF => "EBADF",
        libc::EBADMSG => "EBADMSG",
        libc::EBUSY => "EBUSY",
        libc::ECANCELED => "ECANCELED",
        libc::ECHILD => "ECHILD",
        libc::ECONNABORTED => "ECONNABORTED",
        libc::ECONNREFUSED => "ECONNREFUSED",
        libc::ECONNRESET => "ECONNRESET",
        libc::EDEADLK => "EDEADLK",
        libc::EDESTADDRREQ => "EDESTADDRREQ",
        libc::EDOM => "EDOM",
        libc::EDQUOT => "EDQUOT",
        libc::EEXIST => "EEXIST",
        libc::EFAULT => "EFAULT",
        libc::EFBIG => "EFBIG",
        libc::EHOSTDOWN => "EHOSTDOWN",
        libc::EHOSTUNREACH => "EHOSTUNREACH",
        libc::EIDRM => "EIDRM",
        libc::EILSEQ => "EILSEQ",
        libc::EINPROGRESS => "EINPROGRESS",
        libc::EINTR => "EINTR",
        libc::EINVAL => "EINVAL",
        libc::EIO => "EIO",
        libc::EISCONN => "EISCONN",
        libc::EISDIR => "EISDIR",
        libc::ELOOP => "ELOOP",
        libc::EMFILE => "EMFILE",
        libc::EMLINK => "EMLINK",
        libc::EMSGSIZE => "EMSGSIZE",
        libc::EMULTIHOP => "EMULTIHOP",
        libc::ENAMETOOLONG => "ENAMETOOLONG",
        libc::ENETDOWN => "ENETDOWN",
        libc::ENETRESET => "ENETRESET",
        libc::ENETUNREACH => "ENETUNREACH",
        libc::ENFILE => "ENFILE",
        libc::ENOBUFS => "ENOBUFS",
        libc::ENODEV => "ENODEV",
        libc::ENOENT => "ENOENT",
        libc::ENOEXEC => "ENOEXEC",
        libc::ENOLCK => "ENOLCK",
        libc::ENOLINK => "ENOLINK",
        libc::ENOMEM => "ENOMEM",
        libc::ENOMSG => "ENOMSG",
        libc::ENOPROTOOPT => "ENOPROTOOPT",
        libc::ENOSPC => "ENOSPC",
        libc::ENOSYS => "ENOSYS",
        libc::ENOTBLK => "ENOTBLK",
        libc::ENOTCONN => "ENOTCONN",
        libc::ENOTDIR => "ENOTDIR",
        libc::ENOTEMPTY => "ENOTEMPTY",
        libc::ENOTRECOVERABLE => "ENOTRECOVERABLE",
        libc::ENOTSOCK => "ENOTSOCK",
        libc::ENOTTY => "ENOTTY",
        libc::ENXIO => "ENXIO",
        libc::EOPNOTSUPP => "EOPNOTSUPP",
        libc::EOVERFLOW => "EOVERFLOW",
        libc::EOWNERDEAD => "EOWNERDEAD",
        libc::EPERM => "EPERM",
        libc::EPFNOSUPPORT => "EPFNOSUPPORT",
        libc::EPIPE => "EPIPE",
        libc::EPROTO => "EPROTO",
        libc::EPROTONOSUPPORT => "EPROTONOSUPPORT",
        libc::EPROTOTYPE => "EPROTOTYPE",
        libc::ERANGE => "ERANGE",
        libc::EREMOTE => "EREMOTE",
        libc::EROFS => "EROFS",
        libc::ESHUTDOWN => "ESHUTDOWN",
        libc::ESOCKTNOSUPPORT => "ESOCKTNOSUPPORT",
        libc::ESPIPE => "ESPIPE",
        libc::ESRCH => "ESRCH",
        libc::ESTALE => "ESTALE",
        libc::ETIMEDOUT => "ETIMEDOUT",
        libc::ETOOMANYREFS => "ETOOMANYREFS",
        libc::ETXTBSY => "ETXTBSY",
        libc::EUSERS => "EUSERS",
        libc::EXDEV => "EXDEV",
        _ => return None,
    };

    Some(name)
}

#[cfg(target_os = "linux")]
fn lookup_linux_errno(error: i32) -> Option<&'static str>
{
    let name = match error {
        libc::EADV => "EADV",
        libc::EBADE => "EBADE",
        libc::EBADFD => "EBADFD",
        libc::EBADR => "EBADR",
        libc::EBADRQC => "EBADRQC",
        libc::EBADSLT => "EBADSLT",
        libc::EBFONT => "EBFONT",
        libc::ECHRNG => "ECHRNG",
        libc::ECOMM => "ECOMM",
        libc::EDOTDOT => "EDOTDOT",
        libc::EHWPOISON => "EHWPOISON",
        libc::EISNAM => "EISNAM",
        libc::EKEYEXPIRED => "EKEYEXPIRED",
        libc::EKEYREJECTED => "EKEYREJECTED",
        libc::EKEYREVOKED => "EKEYREVOKED",
        libc::EL2HLT => "EL2HLT",
        libc::EL2NSYNC => "EL2NSYNC",
        libc::EL3HLT => "EL3HLT",
        libc::EL3RST => "EL3RST",
        libc::ELIBACC => "ELIBACC",
        libc::ELIBBAD => "ELIBBAD",
        libc::ELIBEXEC => "ELIBEXEC",
        libc::ELIBMAX => "ELIBMAX",
        libc::ELIBSCN => "ELIBSCN",
        libc::ELNRNG => "ELNRNG",
        libc::EMEDIUMTYPE => "EMEDIUMTYPE",
        libc::ENAVAIL => "ENAVAIL",
        libc::ENOANO => "ENOANO",
        libc::ENOCSI => "ENOCSI",
        libc::ENODATA => "ENODATA",
        libc::ENOKEY => "ENOKEY",
        libc::ENOMEDIUM => "ENOMEDIUM",
        libc::ENONET => "ENONET",
        libc::ENOPKG => "ENOPKG",
        libc::ENOSR => "ENOSR",
        libc::ENOSTR => "ENOSTR",
        libc::ENOTNAM => "ENOTNAM",
        libc::ENOTUNIQ => "ENOTUNIQ",
        libc::EREMCHG => "EREMCHG",
        libc::EREMOTEIO => "EREMOTEIO",
        libc::ERESTART => "ERESTART",
        libc::ERFKILL => "ERFKILL",
        libc::ESRMNT => "ESRMNT",
        libc::ESTRPIPE => "ESTRPIPE",
        libc::ETIME => "ETIME",
        libc::EUCLEAN => "EUCLEAN",
        libc::EUNATCH => "EUNATCH",
        libc::EXFULL => "EXFULL",
        _ => return None,
    };

    Some(name)
}
