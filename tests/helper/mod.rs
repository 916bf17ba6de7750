//! Shared integration test utilities

#![allow(dead_code)]

pub mod fetcher;
pub mod workspace;

pub use fetcher::MockFetcher;
pub use workspace::TestWorkspace;

pub const QQ_PAGE_URL: &str = "https://im.qq.com/rainbow/linuxQQDownload";
pub const QQ_BASE: &str = "https://dldir1.qq.com/qqfile/qq/QQNT/Linux";

/// QQ download page config for a given build, offering x86_64 and aarch64
pub fn qq_payload(base: &str, build: &str) -> String {
    format!(
        r#"<script>var params= {{"version":"3.2.19-39038","updateDate":"2025/09/04",
"x64DownloadUrl":{{"rpm":"{base}/QQ_{build}_x86_64_01.rpm","deb":"{base}/QQ_{build}_amd64_01.deb"}},
"armDownloadUrl":{{"rpm":"{base}/QQ_{build}_aarch64_01.rpm","deb":"{base}/QQ_{build}_arm64_01.deb"}}}};</script>"#
    )
}

pub fn qq_deb(base: &str, build: &str, deb_arch: &str) -> String {
    format!("{base}/QQ_{build}_{deb_arch}_01.deb")
}

/// PKGBUILD shaped like the AUR `linuxqq` package
pub fn qq_pkgbuild(base: &str, build: &str) -> String {
    format!(
        r#"# Maintainer: Someone <someone@example.com>
pkgname=linuxqq
pkgver={build}
pkgrel=2
pkgdesc="New Linux QQ based on Electron"
arch=('x86_64' 'aarch64')
url="https://im.qq.com/linuxqq/"
license=('custom')
depends=('nss' 'alsa-lib' 'gtk3')
source=('LICENSE.html' 'linuxqq.sh')
source_x86_64=("{base}/QQ_{build}_amd64_01.deb")
source_aarch64=("{base}/QQ_{build}_arm64_01.deb")
sha512sums=('SKIP'
            'SKIP')
sha512sums_x86_64=('1111')
sha512sums_aarch64=('2222')

package() {{
    bsdtar -xf data.tar.xz -C "$pkgdir"
    install -Dm644 LICENSE.html -t "$pkgdir/usr/share/licenses/$pkgname"
}}
"#
    )
}
