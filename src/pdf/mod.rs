//! # PDF Serializer
//!
//! Takes the assembled grid pages and writes a valid PDF file.
//!
//! This is a from-scratch PDF 1.7 writer. The output only ever contains
//! raster images and stroked rectangles, so the subset of the format we need
//! is small: no fonts, no text, no annotations.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- catalog
//! 2 0 obj ... endobj  <- page tree
//! ...                 <- image XObjects, content streams, page objects
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! Element coordinates are top-left based (y grows downwards) and are
//! flipped into PDF user space when the content stream is written.

use std::collections::HashMap;
use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use miniz_oxide::deflate::compress_to_vec_zlib;
use tracing::debug;

use crate::assemble::{DrawCommand, GridPage, PageElement};
use crate::config::Metadata;
use crate::image_loader::{ImagePixelData, LoadedImage};

#[derive(Debug, Default)]
pub struct PdfWriter;

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// XObject obj IDs for images, indexed as /Im0, /Im1, ...
    image_objects: Vec<usize>,
    /// Maps (page_index, element_position_in_page) to image index in image_objects.
    image_index_map: HashMap<(usize, usize), usize>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write assembled pages to a PDF byte vector.
    pub fn write(&self, pages: &[GridPage], metadata: &Metadata) -> Vec<u8> {
        let mut builder = PdfBuilder {
            objects: Vec::new(),
            image_objects: Vec::new(),
            image_index_map: HashMap::new(),
        };

        // Reserve object IDs:
        // 0 = placeholder (PDF objects are 1-indexed)
        // 1 = Catalog
        // 2 = Pages (page tree root)
        // 3+ = images, then content streams and page objects
        builder.objects.push(PdfObject { data: vec![] });
        builder.objects.push(PdfObject { data: vec![] });
        builder.objects.push(PdfObject { data: vec![] });

        self.register_images(&mut builder, pages);

        let mut page_obj_ids: Vec<usize> = Vec::new();

        for (page_idx, page) in pages.iter().enumerate() {
            let content = self.build_content_stream_for_page(page, page_idx, &builder);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);

            let content_obj_id = builder.objects.len();
            let mut content_data: Vec<u8> = Vec::new();
            let _ = write!(
                content_data,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            content_data.extend_from_slice(&compressed);
            content_data.extend_from_slice(b"\nendstream");
            builder.objects.push(PdfObject { data: content_data });

            let page_obj_id = builder.objects.len();
            let xobject_resources = self.build_xobject_resource_dict(page_idx, &builder);
            let resources = if xobject_resources.is_empty() {
                String::new()
            } else {
                format!("/XObject << {} >>", xobject_resources)
            };
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                page.width, page.height, content_obj_id, resources
            );
            builder.objects.push(PdfObject {
                data: page_dict.into_bytes(),
            });
            page_obj_ids.push(page_obj_id);
        }

        // Write Catalog (object 1)
        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        // Write Pages tree (object 2)
        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let info_obj_id = {
            let id = builder.objects.len();
            let mut info = String::from("<< ");
            if let Some(ref title) = metadata.title {
                let _ = write!(info, "/Title {} ", Self::encode_text_string(title));
            }
            if let Some(ref creator) = metadata.creator {
                let _ = write!(info, "/Creator {} ", Self::encode_text_string(creator));
            }
            let _ = write!(info, "/Producer (pagegrid {}) >>", env!("CARGO_PKG_VERSION"));
            builder.objects.push(PdfObject {
                data: info.into_bytes(),
            });
            id
        };

        debug!(
            pages = page_obj_ids.len(),
            images = builder.image_objects.len(),
            objects = builder.objects.len() - 1,
            "serializing pdf"
        );
        self.serialize(&builder, info_obj_id)
    }

    /// Build the PDF content stream for a single page.
    fn build_content_stream_for_page(
        &self,
        page: &GridPage,
        page_idx: usize,
        builder: &PdfBuilder,
    ) -> String {
        let mut stream = String::new();
        for (elem_idx, element) in page.elements.iter().enumerate() {
            self.write_element(&mut stream, element, page.height, builder, page_idx, elem_idx);
        }
        stream
    }

    /// Write a single page element as PDF operators.
    fn write_element(
        &self,
        stream: &mut String,
        element: &PageElement,
        page_height: f64,
        builder: &PdfBuilder,
        page_idx: usize,
        elem_idx: usize,
    ) {
        let x = element.x;
        let y = page_height - element.y - element.height;
        let w = element.width;
        let h = element.height;

        match &element.draw {
            DrawCommand::Image { .. } => {
                if let Some(&img_idx) = builder.image_index_map.get(&(page_idx, elem_idx)) {
                    let _ = write!(
                        stream,
                        "q\n{:.2} 0 0 {:.2} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                        w, h, x, y, img_idx
                    );
                }
            }

            DrawCommand::Border { width, color } => {
                if *width > 0.0 {
                    let _ = write!(
                        stream,
                        "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n{:.2} {:.2} {:.2} {:.2} re\nS\nQ\n",
                        color.r, color.g, color.b, width, x, y, w, h
                    );
                }
            }
        }
    }

    /// Walk all pages, create XObject PDF objects for each image,
    /// and populate the image_index_map for content stream reference.
    fn register_images(&self, builder: &mut PdfBuilder, pages: &[GridPage]) {
        for (page_idx, page) in pages.iter().enumerate() {
            for (elem_idx, element) in page.elements.iter().enumerate() {
                if let DrawCommand::Image { image_data } = &element.draw {
                    let img_idx = builder.image_objects.len();
                    let xobj_id = Self::write_image_xobject(builder, image_data);
                    builder.image_objects.push(xobj_id);
                    builder.image_index_map.insert((page_idx, elem_idx), img_idx);
                }
            }
        }
    }

    /// Write a single image as one or two XObject PDF objects.
    /// Returns the main XObject ID.
    fn write_image_xobject(builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
        match &image.pixel_data {
            ImagePixelData::Jpeg { data } => {
                let obj_id = builder.objects.len();
                let mut obj_data: Vec<u8> = Vec::new();
                let _ = write!(
                    obj_data,
                    "<< /Type /XObject /Subtype /Image \
                     /Width {} /Height {} \
                     /ColorSpace /DeviceRGB \
                     /BitsPerComponent 8 \
                     /Filter /DCTDecode \
                     /Length {} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    data.len()
                );
                obj_data.extend_from_slice(data);
                obj_data.extend_from_slice(b"\nendstream");
                builder.objects.push(PdfObject { data: obj_data });
                obj_id
            }

            ImagePixelData::Decoded { rgb, alpha } => {
                // Write SMask first if alpha channel exists
                let smask_id = alpha.as_ref().map(|alpha_data| {
                    let compressed_alpha = compress_to_vec_zlib(alpha_data, 6);
                    let smask_obj_id = builder.objects.len();
                    let mut smask_data: Vec<u8> = Vec::new();
                    let _ = write!(
                        smask_data,
                        "<< /Type /XObject /Subtype /Image \
                         /Width {} /Height {} \
                         /ColorSpace /DeviceGray \
                         /BitsPerComponent 8 \
                         /Filter /FlateDecode \
                         /Length {} >>\nstream\n",
                        image.width_px,
                        image.height_px,
                        compressed_alpha.len()
                    );
                    smask_data.extend_from_slice(&compressed_alpha);
                    smask_data.extend_from_slice(b"\nendstream");
                    builder.objects.push(PdfObject { data: smask_data });
                    smask_obj_id
                });

                let compressed_rgb = compress_to_vec_zlib(rgb, 6);
                let obj_id = builder.objects.len();
                let mut obj_data: Vec<u8> = Vec::new();

                let smask_ref = smask_id
                    .map(|id| format!(" /SMask {} 0 R", id))
                    .unwrap_or_default();

                let _ = write!(
                    obj_data,
                    "<< /Type /XObject /Subtype /Image \
                     /Width {} /Height {} \
                     /ColorSpace /DeviceRGB \
                     /BitsPerComponent 8 \
                     /Filter /FlateDecode \
                     /Length {}{} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    compressed_rgb.len(),
                    smask_ref
                );
                obj_data.extend_from_slice(&compressed_rgb);
                obj_data.extend_from_slice(b"\nendstream");
                builder.objects.push(PdfObject { data: obj_data });
                obj_id
            }
        }
    }

    /// Build the /XObject resource dict entries for a specific page.
    fn build_xobject_resource_dict(&self, page_idx: usize, builder: &PdfBuilder) -> String {
        let mut entries: Vec<(usize, usize)> = builder
            .image_index_map
            .iter()
            .filter(|((pidx, _), _)| *pidx == page_idx)
            .map(|(_, &img_idx)| (img_idx, builder.image_objects[img_idx]))
            .collect();
        entries.sort_by_key(|(idx, _)| *idx);
        entries
            .iter()
            .map(|(idx, obj_id)| format!("/Im{} {} 0 R", idx, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Escape special characters in a PDF string.
    fn escape_pdf_string(s: &str) -> String {
        s.replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)")
    }

    /// Encode an Info-dictionary text string: a literal for ASCII, UTF-16BE
    /// hex with a byte-order mark otherwise.
    fn encode_text_string(s: &str) -> String {
        if s.is_ascii() {
            return format!("({})", Self::escape_pdf_string(s));
        }
        let mut hex = String::from("<FEFF");
        for unit in s.encode_utf16() {
            let _ = write!(hex, "{:04X}", unit);
        }
        hex.push('>');
        hex
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        // Header
        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let header = format!("{} 0 obj\n", i);
            output.extend_from_slice(header.as_bytes());
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::{BorderStyle, Color};
    use crate::config::PageSize;

    fn blank_page() -> GridPage {
        let (width, height) = PageSize::A3.dimensions();
        GridPage {
            width,
            height,
            elements: vec![],
        }
    }

    fn red_pixel() -> LoadedImage {
        LoadedImage {
            pixel_data: ImagePixelData::Decoded {
                rgb: vec![255, 0, 0],
                alpha: None,
            },
            width_px: 1,
            height_px: 1,
        }
    }

    #[test]
    fn test_escape_pdf_string() {
        assert_eq!(
            PdfWriter::escape_pdf_string("Hello (World)"),
            "Hello \\(World\\)"
        );
        assert_eq!(PdfWriter::escape_pdf_string("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_non_ascii_text_string_is_utf16() {
        assert_eq!(PdfWriter::encode_text_string("plain"), "(plain)");
        assert_eq!(PdfWriter::encode_text_string("é"), "<FEFF00E9>");
    }

    #[test]
    fn test_empty_document_produces_valid_pdf() {
        let bytes = PdfWriter::new().write(&[blank_page()], &Metadata::default());

        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(bytes.windows(5).any(|w| w == b"%%EOF"));
        assert!(bytes.windows(4).any(|w| w == b"xref"));
        assert!(bytes.windows(7).any(|w| w == b"trailer"));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Count 1"));
        assert!(text.contains("/MediaBox [0 0 841.89 1190.55]"));
    }

    #[test]
    fn test_metadata_in_pdf() {
        let metadata = Metadata {
            title: Some("Test Document".to_string()),
            creator: None,
        };
        let bytes = PdfWriter::new().write(&[blank_page()], &metadata);
        let text = String::from_utf8_lossy(&bytes);

        assert!(text.contains("/Title (Test Document)"));
        assert!(!text.contains("/Creator"));
        assert!(text.contains("/Producer (pagegrid "));
    }

    #[test]
    fn test_image_and_border_operators() {
        let mut page = blank_page();
        page.elements.push(PageElement {
            x: 20.0,
            y: 20.0,
            width: 200.0,
            height: 200.0,
            draw: DrawCommand::Image {
                image_data: red_pixel(),
            },
        });
        page.elements.push(PageElement {
            x: 20.0,
            y: 20.0,
            width: 200.0,
            height: 200.0,
            draw: DrawCommand::Border {
                width: BorderStyle::default().width,
                color: Color::BLACK,
            },
        });

        let writer = PdfWriter::new();
        let mut builder = PdfBuilder {
            objects: vec![
                PdfObject { data: vec![] },
                PdfObject { data: vec![] },
                PdfObject { data: vec![] },
            ],
            image_objects: Vec::new(),
            image_index_map: HashMap::new(),
        };
        writer.register_images(&mut builder, std::slice::from_ref(&page));
        assert_eq!(builder.image_objects.len(), 1);

        let stream = writer.build_content_stream_for_page(&page, 0, &builder);
        // y is flipped: 1190.55 - 20 - 200
        assert!(stream.contains("200.00 0 0 200.00 20.00 970.55 cm\n/Im0 Do"));
        assert!(stream.contains("0.000 0.000 0.000 RG\n2.00 w\n20.00 970.55 200.00 200.00 re\nS"));
        assert_eq!(
            writer.build_xobject_resource_dict(0, &builder),
            format!("/Im0 {} 0 R", builder.image_objects[0])
        );
    }

    #[test]
    fn test_alpha_writes_smask() {
        let mut page = blank_page();
        page.elements.push(PageElement {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            draw: DrawCommand::Image {
                image_data: LoadedImage {
                    pixel_data: ImagePixelData::Decoded {
                        rgb: vec![0, 0, 0],
                        alpha: Some(vec![10]),
                    },
                    width_px: 1,
                    height_px: 1,
                },
            },
        });
        let bytes = PdfWriter::new().write(&[page], &Metadata::default());
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/SMask"));
        assert!(text.contains("/ColorSpace /DeviceGray"));
    }
}
