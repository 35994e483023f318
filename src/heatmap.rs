//! PNG heatmap of a correlation matrix.

use std::path::Path;

use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use log::info;

use crate::analysis::LabeledMatrix;
use crate::color::DivergingColorMap;

/// Pixel layout of the rendered heatmap.
#[derive(Debug, Clone)]
pub struct HeatmapLayout {
    pub cell_size: u32,
    pub margin: u32,
    pub legend_width: u32,
    pub legend_gap: u32,
}

impl Default for HeatmapLayout {
    fn default() -> Self {
        Self {
            cell_size: 48,
            margin: 16,
            legend_width: 20,
            legend_gap: 24,
        }
    }
}

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const GRID: Rgb<u8> = Rgb([90, 90, 90]);

/// Draw the matrix: row `i` top to bottom, column `j` left to right, both in
/// selection order, with a colour legend from +1 (top) to -1 (bottom).
pub fn draw_heatmap(
    matrix: &LabeledMatrix,
    cmap: &DivergingColorMap,
    layout: &HeatmapLayout,
) -> RgbImage {
    let n = matrix.size() as u32;
    let grid_side = (n * layout.cell_size).max(layout.cell_size);
    let width = layout.margin * 2 + grid_side + layout.legend_gap + layout.legend_width;
    let height = layout.margin * 2 + grid_side;

    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);

    for i in 0..n {
        for j in 0..n {
            let color = cmap.color_for(matrix.at(i as usize, j as usize));
            let x0 = layout.margin + j * layout.cell_size;
            let y0 = layout.margin + i * layout.cell_size;
            fill_rect(&mut img, x0, y0, layout.cell_size, layout.cell_size, color);
        }
    }

    // Grid lines, including the outer border.
    for k in 0..=n {
        let offset = layout.margin + (k * layout.cell_size).min(grid_side - 1);
        for t in 0..grid_side {
            img.put_pixel(offset, layout.margin + t, GRID);
            img.put_pixel(layout.margin + t, offset, GRID);
        }
    }

    // Legend bar.
    let legend_x = layout.margin + grid_side + layout.legend_gap;
    let stops = cmap.legend_entries(grid_side as usize);
    for (row, (_, color)) in stops.iter().enumerate() {
        for dx in 0..layout.legend_width {
            img.put_pixel(legend_x + dx, layout.margin + row as u32, *color);
        }
    }

    img
}

fn fill_rect(img: &mut RgbImage, x0: u32, y0: u32, w: u32, h: u32, color: Rgb<u8>) {
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            img.put_pixel(x, y, color);
        }
    }
}

/// Render and save the heatmap as PNG.
pub fn save_heatmap(matrix: &LabeledMatrix, path: &Path) -> Result<()> {
    let img = draw_heatmap(matrix, &DivergingColorMap::default(), &HeatmapLayout::default());
    img.save(path)
        .with_context(|| format!("writing heatmap to {}", path.display()))?;
    info!(
        "Heatmap ({}x{} px) written to {}",
        img.width(),
        img.height(),
        path.display()
    );
    Ok(())
}
