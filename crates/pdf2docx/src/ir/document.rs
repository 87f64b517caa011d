use super::elements::Block;

/// Top-level document model produced by the PDF reader and consumed by the DOCX writer.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub pages: Vec<Page>,
}

impl Document {
    /// Total number of paragraphs across all pages.
    pub fn paragraph_count(&self) -> usize {
        self.pages
            .iter()
            .flat_map(|page| &page.blocks)
            .filter(|block| matches!(block, Block::Paragraph(_)))
            .count()
    }
}

/// One source PDF page.
#[derive(Debug, Clone)]
pub struct Page {
    /// 1-indexed page number in the source PDF.
    pub number: u32,
    pub size: PageSize,
    pub blocks: Vec<Block>,
}

/// Page dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    /// Width in points (1 pt = 1/72 inch).
    pub width: f64,
    /// Height in points.
    pub height: f64,
}

impl Default for PageSize {
    fn default() -> Self {
        // A4 in points
        Self {
            width: 595.28,
            height: 841.89,
        }
    }
}

impl PageSize {
    /// Width in twips (1/20 of a point), the unit DOCX section properties use.
    pub fn width_twips(&self) -> u32 {
        points_to_twips(self.width)
    }

    /// Height in twips.
    pub fn height_twips(&self) -> u32 {
        points_to_twips(self.height)
    }
}

fn points_to_twips(points: f64) -> u32 {
    (points * 20.0).round().max(0.0) as u32
}
