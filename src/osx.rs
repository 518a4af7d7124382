//! macOS-specific utilities.

// cocoa marks its whole API deprecated in favour of objc2.
#![allow(deprecated)]

use anyhow::Result;
use std::path::Path;

#[cfg(target_os = "macos")]
use cocoa::base::{id, nil};
#[cfg(target_os = "macos")]
use objc::{class, msg_send, sel, sel_impl};

/// `NSWorkspaceLaunchNewInstance`
#[cfg(target_os = "macos")]
const LAUNCH_NEW_INSTANCE: cocoa::foundation::NSUInteger = 0x0008_0000;

#[cfg(target_os = "macos")]
unsafe fn nsstring_to_string(s: id) -> Option<String> {
    use cocoa::foundation::NSString;
    use std::ffi::CStr;

    if s == nil {
        return None;
    }
    unsafe {
        let ptr = s.UTF8String();
        if ptr.is_null() {
            return None;
        }
        Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
    }
}

/// Bundle identifiers of every application NSWorkspace reports as running.
#[cfg(target_os = "macos")]
pub fn running_bundle_ids() -> Vec<String> {
    use cocoa::foundation::{NSArray, NSAutoreleasePool};

    unsafe {
        let pool = NSAutoreleasePool::new(nil);
        let workspace: id = msg_send![class!(NSWorkspace), sharedWorkspace];
        let apps: id = msg_send![workspace, runningApplications];
        let mut res = Vec::new();
        if apps != nil {
            for i in 0..apps.count() {
                let app = apps.objectAtIndex(i);
                let bid: id = msg_send![app, bundleIdentifier];
                if let Some(s) = nsstring_to_string(bid) {
                    res.push(s);
                }
            }
        }
        pool.drain();
        res
    }
}

/// Ask NSWorkspace to start a new instance of the bundle at `path`,
/// even when one is already running.
#[cfg(target_os = "macos")]
pub fn open_new_instance(path: &Path) -> Result<()> {
    use cocoa::foundation::{NSAutoreleasePool, NSString};

    unsafe {
        let pool = NSAutoreleasePool::new(nil);
        let ns_path = NSString::alloc(nil)
            .init_str(&path.to_string_lossy())
            .autorelease();
        let url: id = msg_send![class!(NSURL), fileURLWithPath: ns_path];
        let workspace: id = msg_send![class!(NSWorkspace), sharedWorkspace];
        let configuration: id = msg_send![class!(NSDictionary), dictionary];
        let mut error: id = nil;
        let launched: id = msg_send![workspace,
            launchApplicationAtURL: url
            options: LAUNCH_NEW_INSTANCE
            configuration: configuration
            error: &mut error as *mut id];

        let res = if launched != nil {
            Ok(())
        } else {
            let reason = if error != nil {
                let desc: id = msg_send![error, localizedDescription];
                nsstring_to_string(desc)
            } else {
                None
            };
            Err(anyhow::anyhow!(
                "NSWorkspace could not open {:?}: {}",
                path,
                reason.unwrap_or_else(|| "unknown error".into())
            ))
        };
        pool.drain();
        res
    }
}

#[cfg(not(target_os = "macos"))]
pub fn open_new_instance(path: &Path) -> Result<()> {
    Err(anyhow::anyhow!(
        "NSWorkspace is only available on macOS, cannot open {:?}",
        path
    ))
}

/// Reveal path in Finder (macOS)
pub fn reveal_in_finder(path: &Path) -> Result<()> {
    use anyhow::Context;

    if !cfg!(target_os = "macos") {
        return Err(anyhow::anyhow!(
            "Reveal in Finder is supported only on macOS"
        ));
    }
    let status = std::process::Command::new("/usr/bin/open")
        .arg("-R")
        .arg(path)
        .status()
        .with_context(|| format!("Failed to run open -R {:?}", path))?;
    if !status.success() {
        return Err(anyhow::anyhow!("open -R exited with {}", status));
    }
    Ok(())
}
