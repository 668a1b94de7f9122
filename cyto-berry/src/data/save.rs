//! 强度图像的可视化转换.

use super::{IntensityImage, IntensityWindow};
use crate::consts::gray::BLACK;
use image::{GrayImage, Luma};

/// 用 `window` 把强度图映射为 8-bit 灰度图. 无意义的强度 (inf, NaN) 映射为黑色.
pub(crate) fn windowed_gray(img: &IntensityImage, window: &IntensityWindow) -> GrayImage {
    let (height, width) = img.shape();
    let mut buf = GrayImage::new(width as u32, height as u32);
    for ((h, w), &v) in img.data().indexed_iter() {
        let gray = window.eval(v).unwrap_or(BLACK);
        buf.put_pixel(w as u32, h as u32, Luma([gray]));
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::windowed_gray;
    use crate::{IntensityImage, IntensityWindow};
    use ndarray::array;

    #[test]
    fn test_windowed_gray() {
        let img = IntensityImage::from_array(array![[0.0, 0.5, f32::NAN], [1.0, 0.25, 2.0]]);
        let buf = windowed_gray(&img, &IntensityWindow::new(0.0, 1.0).unwrap());
        assert_eq!(buf.dimensions(), (3, 2));
        assert_eq!(buf.get_pixel(0, 0).0, [0]);
        assert_eq!(buf.get_pixel(0, 1).0, [255]);
        assert_eq!(buf.get_pixel(2, 0).0, [0]);
        assert_eq!(buf.get_pixel(2, 1).0, [255]);
    }
}
