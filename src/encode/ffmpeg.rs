use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Encode one RGBA frame to an image file; ffmpeg picks the format from the
/// output extension (png, jpg, bmp, ...).
pub fn write_image(output_path: &Path, rgba_pixels: &[u8], width: u32, height: u32) -> Result<()> {
    let expected = width as usize * height as usize * 4;
    if rgba_pixels.len() != expected {
        anyhow::bail!(
            "Pixel buffer has {} bytes, expected {} for {}x{} RGBA",
            rgba_pixels.len(),
            expected,
            width,
            height
        );
    }

    let args = image_args(output_path, width, height);

    let mut child = Command::new("ffmpeg")
        .args(&args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .context("Failed to spawn ffmpeg. Is ffmpeg installed?")?;

    {
        let stdin = child.stdin.as_mut().context("FFmpeg stdin not available")?;
        stdin
            .write_all(rgba_pixels)
            .context("Failed to write frame to ffmpeg")?;
    }
    // Close stdin to signal EOF
    drop(child.stdin.take());

    let output = child.wait_with_output().context("Failed to wait for ffmpeg")?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("FFmpeg exited with error:\n{}", stderr);
    }

    log::info!("Wrote {}x{} image to {}", width, height, output_path.display());
    Ok(())
}

fn image_args(output_path: &Path, width: u32, height: u32) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-loglevel".into(), "error".into(),
        "-f".into(), "rawvideo".into(),
        "-pixel_format".into(), "rgba".into(),
        "-video_size".into(), format!("{}x{}", width, height),
        "-i".into(), "pipe:0".into(),
        "-frames:v".into(), "1".into(),
        "-update".into(), "1".into(),
        output_path.to_string_lossy().into_owned(),
    ]
}
