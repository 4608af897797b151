//! Desktop background setting
//!
//! Each platform gets its own [`WallpaperSetter`]. [`platform_setter`] picks
//! the one for the target the binary was built for.

use std::path::Path;
#[cfg(any(test, target_os = "linux", target_os = "macos", target_os = "windows"))]
use std::process::Command;
use tracing::debug;

use crate::error::{AppError, Result};

/// Something that can make a local image file the desktop background
pub trait WallpaperSetter {
    fn set_wallpaper(&self, image_path: &Path) -> Result<()>;
}

/// Leaves the desktop alone (`--no-wallpaper`)
#[derive(Debug, Default)]
pub struct NoopWallpaper;

impl WallpaperSetter for NoopWallpaper {
    fn set_wallpaper(&self, image_path: &Path) -> Result<()> {
        debug!("Skipping desktop background for {}", image_path.display());
        Ok(())
    }
}

/// GNOME and derivatives, via gsettings
#[cfg(target_os = "linux")]
#[derive(Debug, Default)]
pub struct GnomeWallpaper;

#[cfg(target_os = "linux")]
impl WallpaperSetter for GnomeWallpaper {
    fn set_wallpaper(&self, image_path: &Path) -> Result<()> {
        let uri = file_uri(image_path)?;
        run(&mut gsettings("picture-uri", &uri))?;

        // Only exists on GNOME 42+
        if let Err(e) = run(&mut gsettings("picture-uri-dark", &uri)) {
            debug!("Could not set picture-uri-dark: {}", e);
        }
        Ok(())
    }
}

/// macOS, via AppleScript
#[cfg(target_os = "macos")]
#[derive(Debug, Default)]
pub struct MacWallpaper;

#[cfg(target_os = "macos")]
impl WallpaperSetter for MacWallpaper {
    fn set_wallpaper(&self, image_path: &Path) -> Result<()> {
        let path = absolute(image_path)?;
        let script = format!(
            "tell application \"System Events\" to tell every desktop to set picture to \"{}\"",
            escape(&path.to_string_lossy(), '"', "\\\"")
        );
        run(Command::new("osascript").args(["-e", &script]))
    }
}

/// Windows, via SystemParametersInfoW(SPI_SETDESKWALLPAPER) from PowerShell
#[cfg(target_os = "windows")]
#[derive(Debug, Default)]
pub struct WindowsWallpaper;

#[cfg(target_os = "windows")]
impl WallpaperSetter for WindowsWallpaper {
    fn set_wallpaper(&self, image_path: &Path) -> Result<()> {
        let path = absolute(image_path)?;
        // SPI_SETDESKWALLPAPER = 20, SPIF_UPDATEINIFILE | SPIF_SENDCHANGE = 3
        let script = format!(
            "Add-Type -TypeDefinition 'using System.Runtime.InteropServices; \
             public class Wallpaper {{ [DllImport(\"user32.dll\", CharSet = CharSet.Unicode)] \
             public static extern int SystemParametersInfo(int a, int b, string c, int d); }}'; \
             if ([Wallpaper]::SystemParametersInfo(20, 0, '{}', 3) -eq 0) {{ exit 1 }}",
            escape(&path.to_string_lossy(), '\'', "''")
        );
        run(Command::new("powershell").args(["-NoProfile", "-NonInteractive", "-Command", &script]))
    }
}

/// Fails on every call; used on targets with no known mechanism
#[cfg(any(test, not(any(target_os = "linux", target_os = "macos", target_os = "windows"))))]
#[derive(Debug, Default)]
pub struct UnsupportedWallpaper;

#[cfg(any(test, not(any(target_os = "linux", target_os = "macos", target_os = "windows"))))]
impl WallpaperSetter for UnsupportedWallpaper {
    fn set_wallpaper(&self, _image_path: &Path) -> Result<()> {
        Err(AppError::Wallpaper(format!(
            "unsupported platform: {}",
            std::env::consts::OS
        )))
    }
}

/// The setter for the platform this binary targets
pub fn platform_setter() -> Box<dyn WallpaperSetter> {
    #[cfg(target_os = "linux")]
    return Box::new(GnomeWallpaper);

    #[cfg(target_os = "macos")]
    return Box::new(MacWallpaper);

    #[cfg(target_os = "windows")]
    return Box::new(WindowsWallpaper);

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    return Box::new(UnsupportedWallpaper);
}

#[cfg(target_os = "linux")]
fn gsettings(key: &str, uri: &str) -> Command {
    let mut command = Command::new("gsettings");
    command.args(["set", "org.gnome.desktop.background", key, uri]);
    command
}

/// Percent-encoded `file://` URI for a local path
#[cfg(any(test, target_os = "linux"))]
fn file_uri(path: &Path) -> Result<String> {
    let path = absolute(path)?;
    reqwest::Url::from_file_path(&path)
        .map(String::from)
        .map_err(|()| AppError::Wallpaper(format!("not a valid file path: {}", path.display())))
}

#[cfg(any(test, target_os = "linux", target_os = "macos", target_os = "windows"))]
fn absolute(path: &Path) -> Result<std::path::PathBuf> {
    Ok(std::path::absolute(path)?)
}

#[cfg(any(test, target_os = "macos", target_os = "windows"))]
fn escape(value: &str, quote: char, replacement: &str) -> String {
    value.replace(quote, replacement)
}

#[cfg(any(test, target_os = "linux", target_os = "macos", target_os = "windows"))]
fn run(command: &mut Command) -> Result<()> {
    let program = command.get_program().to_string_lossy().to_string();
    let output = command
        .output()
        .map_err(|e| AppError::Wallpaper(format!("{}: {}", program, e)))?;

    if output.status.success() {
        Ok(())
    } else {
        Err(AppError::Wallpaper(format!(
            "{} exited with {}: {}",
            program,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_always_succeeds() {
        assert!(NoopWallpaper.set_wallpaper(Path::new("/tmp/x/bar.jpg")).is_ok());
    }

    #[test]
    fn test_unsupported_reports_platform() {
        let err = UnsupportedWallpaper
            .set_wallpaper(Path::new("/tmp/x/bar.jpg"))
            .unwrap_err();

        assert!(err.to_string().contains("unsupported platform"));
    }

    #[test]
    fn test_escape_quotes() {
        assert_eq!(escape("C:\\It's here.jpg", '\'', "''"), "C:\\It''s here.jpg");
        assert_eq!(escape("/a \"b\".jpg", '"', "\\\""), "/a \\\"b\\\".jpg");
    }

    #[cfg(unix)]
    #[test]
    fn test_file_uri_is_percent_encoded() {
        let uri = file_uri(Path::new("/tmp/my pictures/a b#c.jpg")).unwrap();
        assert_eq!(uri, "file:///tmp/my%20pictures/a%20b%23c.jpg");
    }

    #[cfg(unix)]
    #[test]
    fn test_file_uri_of_relative_path_is_absolute() {
        let uri = file_uri(Path::new("galaxy.png")).unwrap();
        assert!(uri.starts_with("file:///"));
        assert!(uri.ends_with("/galaxy.png"));
    }

    #[test]
    fn test_missing_program_is_an_error() {
        let err = run(&mut Command::new("definitely-not-a-real-wallpaper-tool")).unwrap_err();
        assert!(matches!(err, AppError::Wallpaper(_)));
    }
}
