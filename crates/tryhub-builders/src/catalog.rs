//! Builtin builder and host catalog.
//!
//! Platform support windows live here as rules; add a rule rather than
//! special-casing a builder in the engine.

use crate::profile::{BuilderProfile, HostProfile};
use crate::rules::{DistTestSkip, RunMode, Rule};

const MISC_COMPILE: &[&str] = &[
    "other", "darwin", "linuxarm", "solaris", "freebsd", "mips", "nacl", "netbsd", "openbsd",
    "plan9", "ppc",
];

fn host(name: &str) -> HostProfile {
    HostProfile::new(name)
}

fn darwin_host(name: &str) -> HostProfile {
    // Physical Macs are slow and few.
    host(name).skip_dist_tests(DistTestSkip::new(
        &["api", "reboot", "codewalk", "test:*"],
        RunMode::Both,
    ))
}

pub fn hosts() -> Vec<HostProfile> {
    vec![
        host("host-linux-stretch"),
        host("host-linux-jessie").with_notes("cross-compile only"),
        host("host-linux-arm5spacemonkey")
            .with_env("GO_TEST_TIMEOUT_SCALE=5")
            .with_notes("ARMv5 board"),
        host("host-android-amd64-emu"),
        host("host-android-arm64-corellium-android"),
        host("host-darwin-arm64-corellium-ios"),
        host("host-freebsd-10_3"),
        host("host-freebsd-11_1"),
        host("host-freebsd-11_2"),
        host("host-freebsd-12_0"),
        host("host-netbsd-amd64-8_0"),
        host("host-netbsd-386-8_0"),
        host("host-aix-ppc64").with_env("GO_TEST_TIMEOUT_SCALE=2"),
        host("host-illumos-amd64-joyent"),
        host("host-js-wasm"),
        host("host-openbsd-amd64-62"),
        host("host-openbsd-amd64-64"),
        host("host-openbsd-386-64"),
        host("host-plan9-386-gce"),
        host("host-plan9-amd64-9front"),
        host("host-plan9-arm-0intro").with_env("GO_TEST_TIMEOUT_SCALE=3"),
        host("host-windows-amd64-2008"),
        host("host-windows-amd64-2016"),
        darwin_host("host-darwin-10_10"),
        darwin_host("host-darwin-10_11"),
        darwin_host("host-darwin-10_12"),
        darwin_host("host-darwin-10_14"),
    ]
}

fn b(name: &str, host_type: &str) -> BuilderProfile {
    BuilderProfile::new(name, host_type)
}

pub fn builders() -> Vec<BuilderProfile> {
    let mut all = vec![
        // Linux
        b("linux-386", "host-linux-stretch").try_bot(),
        b("linux-386-387", "host-linux-stretch")
            .with_env("GO386=387")
            .rule(Rule::never().except(&["go", "crypto"])),
        b("linux-amd64", "host-linux-stretch")
            .try_bot()
            .opt_in(&["exp"]),
        b("linux-amd64-race", "host-linux-stretch")
            .try_bot()
            .opt_in(&["exp"])
            .skip_dist_tests(DistTestSkip::new(&["reboot"], RunMode::TryBot)),
        b("linux-amd64-longtest", "host-linux-stretch")
            .opt_in(&["exp"])
            .rule(Rule::master_only().for_subrepos())
            .with_env("GO_TEST_TIMEOUT_SCALE=5"),
        b("linux-amd64-ssacheck", "host-linux-stretch").rule(Rule::never().for_subrepos()),
        b("linux-amd64-noopt", "host-linux-stretch").rule(Rule::never().for_subrepos()),
        b("linux-amd64-nocgo", "host-linux-stretch").with_env("CGO_ENABLED=0"),
        b("linux-amd64-androidemu", "host-android-amd64-emu")
            .try_bot()
            .opt_in(&["mobile"])
            .rule(Rule::never().except(&["mobile"])),
        b("linux-arm-arm5spacemonkey", "host-linux-arm5spacemonkey")
            .rule(Rule::never().for_subrepos()),
        // Android
        b("android-amd64-emu", "host-android-amd64-emu")
            .try_bot()
            .opt_in(&["mobile"])
            .rule(Rule::min_go(1, 13)),
        b("android-386-emu", "host-android-amd64-emu")
            .opt_in(&["mobile"])
            .rule(Rule::min_go(1, 13)),
        b("android-arm-corellium", "host-android-arm64-corellium-android"),
        b("android-arm64-corellium", "host-android-arm64-corellium-android"),
        b("darwin-arm64-corellium", "host-darwin-arm64-corellium-ios"),
        // FreeBSD. Go 1.12 is the last release for 10.x and 11.1.
        b("freebsd-386-10_3", "host-freebsd-10_3").rule(Rule::max_go(1, 12)),
        b("freebsd-amd64-10_3", "host-freebsd-10_3")
            .try_bot()
            .rule(Rule::max_go(1, 12)),
        b("freebsd-amd64-11_1", "host-freebsd-11_1").rule(Rule::max_go(1, 12)),
        b("freebsd-386-11_2", "host-freebsd-11_2")
            .try_bot()
            .rule(Rule::min_go(1, 12).for_repos(&["net"]))
            .rule(Rule::never().except(&["sys"]).on_try_bot()),
        b("freebsd-amd64-11_2", "host-freebsd-11_2")
            .try_bot()
            .rule(Rule::never().except(&["sys"]).on_try_bot()),
        b("freebsd-amd64-12_0", "host-freebsd-12_0").try_bot(),
        b("freebsd-386-12_0", "host-freebsd-12_0").rule(Rule::min_go(1, 12).for_repos(&["net"])),
        b("freebsd-amd64-race", "host-freebsd-11_1"),
        // NetBSD
        b("netbsd-amd64-8_0", "host-netbsd-amd64-8_0")
            .try_bot()
            .rule(Rule::never().except(&["sys"]).on_try_bot()),
        b("netbsd-386-8_0", "host-netbsd-386-8_0").rule(Rule::never()),
        // AIX starts at Go 1.12, subrepos at 1.13.
        b("aix-ppc64", "host-aix-ppc64")
            .rule(Rule::min_go(1, 12))
            .rule(Rule::min_go(1, 13).for_subrepos())
            .rule(Rule::never().for_repos(&["term"])),
        b("illumos-amd64-joyent", "host-illumos-amd64-joyent").rule(Rule::min_go(1, 13)),
        // NaCl
        b("nacl-386", "host-linux-stretch").rule(Rule::never().for_subrepos()),
        b("nacl-amd64p32", "host-linux-stretch")
            .try_bot()
            .rule(Rule::never().for_subrepos()),
        // Only tip, and only a few subrepos.
        b("js-wasm", "host-js-wasm")
            .try_bot()
            .rule(
                Rule::never()
                    .for_subrepos()
                    .except(&["arch", "crypto", "net", "sys"]),
            )
            .rule(Rule::master_only().for_subrepos())
            .rule(Rule::never().for_subrepos().on_try_bot()),
        // OpenBSD
        b("openbsd-amd64-62", "host-openbsd-amd64-62"),
        b("openbsd-amd64-64", "host-openbsd-amd64-64").try_bot(),
        b("openbsd-386-64", "host-openbsd-386-64")
            .try_bot()
            .rule(Rule::never().except(&["sys"]).on_try_bot()),
        // Plan 9 only ever lived at master.
        b("plan9-386", "host-plan9-386-gce")
            .rule(Rule::never())
            .with_notes("disabled while always failing"),
        b("plan9-amd64-9front", "host-plan9-amd64-9front").rule(Rule::master_only()),
        b("plan9-arm", "host-plan9-arm-0intro").rule(Rule::master_only()),
        // Windows
        b("windows-386-2008", "host-windows-amd64-2008")
            .try_bot()
            .opt_in(&["exp"]),
        b("windows-amd64-2016", "host-windows-amd64-2016")
            .try_bot()
            .opt_in(&["exp"]),
        b("windows-amd64-race", "host-windows-amd64-2016"),
        // macOS. Subrepos run on the newer amd64 machines only.
        b("darwin-amd64-10_10", "host-darwin-10_10")
            .rule(Rule::max_go(1, 12))
            .rule(Rule::never().for_subrepos()),
        b("darwin-amd64-10_11", "host-darwin-10_11").rule(Rule::never().for_subrepos()),
        b("darwin-amd64-10_12", "host-darwin-10_12").opt_in(&["exp"]),
        b("darwin-amd64-10_14", "host-darwin-10_14").opt_in(&["exp"]),
        b("darwin-386-10_14", "host-darwin-10_14").rule(Rule::never().for_subrepos()),
        b("darwin-amd64-race", "host-darwin-10_12").rule(Rule::never().for_subrepos()),
    ];

    all.extend(MISC_COMPILE.iter().map(|suffix| {
        b(&format!("misc-compile-{suffix}"), "host-linux-jessie")
            .try_bot()
            .rule(Rule::never().for_subrepos())
            .with_notes("cross-compiles only, runs no tests")
    }));
    all
}
