use crate::aztec::{AztecCode, AztecOptions};
use crate::error::AztecError;

use image::{ImageBuffer, Luma};
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/*---- Utilities ----*/

// Returns a string of SVG code for an image depicting
// the given Aztec symbol, with the given number of border modules.
// The string always uses Unix newlines (\n), regardless of the platform.
pub fn to_svg_string(code: &AztecCode, border: usize) -> String {
    let mut result = String::new();
    result += "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
    result += "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n";
    let dimension = code.size() + border * 2;
    result += &format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" viewBox=\"0 0 {0} {0}\" stroke=\"none\">\n",
        dimension
    );
    result += "\t<rect width=\"100%\" height=\"100%\" fill=\"#FFFFFF\"/>\n";
    result += "\t<path d=\"";
    let mut first = true;
    for y in 0..code.size() {
        for x in 0..code.size() {
            if code.matrix().get(x, y) {
                if !first {
                    result += " ";
                }
                first = false;
                result += &format!("M{},{}h1v1h-1z", x + border, y + border);
            }
        }
    }
    result += "\" fill=\"#000000\"/>\n";
    result += "</svg>\n";
    result
}

/// Renders the symbol as text, two characters per module, one line per row.
pub fn to_console_string(code: &AztecCode, border: usize) -> String {
    let border = border as i32;
    let size = code.size() as i32;
    let mut result = String::new();
    for y in -border..size + border {
        for x in -border..size + border {
            let c = if code.get_module(x, y) { '█' } else { ' ' };
            result.push(c);
            result.push(c);
        }
        result.push('\n');
    }
    result
}

/// Prints the given Aztec symbol to the console.
pub fn print_code(code: &AztecCode) {
    println!("{}", to_console_string(code, 2));
}

/// Renders the symbol at one pixel per module, surrounded by `border`
/// light modules.
///
/// # Example
///
/// ```
/// use aztecrust::{AztecCode, AztecOptions};
/// use aztecrust::helper::to_image_buffer;
///
/// let code = AztecCode::encode_text("Hello, World!", &AztecOptions::default()).unwrap();
/// let img = to_image_buffer(&code, 2);
/// assert_eq!(img.width() as usize, code.size() + 4);
/// ```
pub fn to_image_buffer(code: &AztecCode, border: u32) -> ImageBuffer<Luma<u8>, Vec<u8>> {
    let size = code.size() as u32 + 2 * border;
    let mut img = ImageBuffer::new(size, size);

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let code_x = x as i32 - border as i32;
        let code_y = y as i32 - border as i32;
        *pixel = if code.get_module(code_x, code_y) {
            Luma([0u8]) // Black
        } else {
            Luma([255u8]) // White
        };
    }

    img
}

/// Scales the symbol into a `width` x `height` image.
///
/// The output is never smaller than the symbol plus `margin` light modules
/// on every side. Each module becomes an integral square of pixels and the
/// symbol is centered, so any leftover pixels end up in the margin.
///
/// # Arguments
///
/// * `code` - The symbol to render.
/// * `width` - Requested width in pixels.
/// * `height` - Requested height in pixels.
/// * `margin` - Minimal quiet zone, in modules.
pub fn render_image(
    code: &AztecCode,
    width: u32,
    height: u32,
    margin: u32
) -> ImageBuffer<Luma<u8>, Vec<u8>> {
    let input_size = code.size() as u32;
    let full_size = input_size + 2 * margin;
    let output_width = width.max(full_size);
    let output_height = height.max(full_size);
    let multiple = (output_width / full_size).min(output_height / full_size);
    let left_padding = (output_width - input_size * multiple) / 2;
    let top_padding = (output_height - input_size * multiple) / 2;

    ImageBuffer::from_fn(output_width, output_height, |x, y| {
        let dark = x >= left_padding &&
            y >= top_padding &&
            code.get_module(((x - left_padding) / multiple) as i32, ((y - top_padding) / multiple) as i32);
        if dark { Luma([0u8]) } else { Luma([255u8]) }
    })
}

/// Saves the symbol to a PNG file.
///
/// # Arguments
///
/// * `code` - The symbol to save.
/// * `directory_path` - Optional. The directory path where the image will be saved. If not provided, the default directory is "generated".
/// * `filename` - Optional. The name of the image file, without extension. If not provided, a timestamp-based filename will be used.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the image cannot be written.
///
/// # Example
///
/// ```no_run
/// use aztecrust::{AztecCode, AztecOptions};
/// use aztecrust::helper::save_image;
///
/// let code = AztecCode::encode_text("Hello, World!", &AztecOptions::default()).unwrap();
/// save_image(&code, Some("images"), Some("aztec_code")).unwrap();
/// ```
pub fn save_image(
    code: &AztecCode,
    directory_path: Option<&str>,
    filename: Option<&str>
) -> Result<(), AztecError> {
    let img = to_image_buffer(code, 2);

    let directory_path = directory_path.unwrap_or("generated");
    let filename = match filename {
        Some(name) => name.to_string(),
        None => {
            let since_the_epoch = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
            format!("{}", since_the_epoch.as_millis())
        }
    };

    let file_path = Path::new(directory_path).join(format!("{}.png", filename));

    // Check if the directory exists, create it if it doesn't
    if !Path::new(directory_path).exists() {
        fs::create_dir_all(directory_path)?;
    }

    img.save(&file_path)?;
    Ok(())
}

/// Encodes `content` with default options and returns its SVG rendering.
///
/// # Example
///
/// ```
/// use aztecrust::helper::generate_svg_string;
///
/// let svg_string = generate_svg_string("Hello, World!").unwrap();
/// assert!(svg_string.contains("<path"));
/// ```
pub fn generate_svg_string(content: &str) -> Result<String, AztecError> {
    let code = AztecCode::encode_text(content, &AztecOptions::default())?;
    Ok(to_svg_string(&code, 2))
}
