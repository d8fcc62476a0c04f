use arcal_core::BoardSpec;
use nalgebra::Point2;

/// Chessboard corner detector supplied by a vision backend.
pub trait BoardDetector {
    /// Frame type the backend consumes (image buffer, video frame handle, ...).
    type Frame: ?Sized;

    /// Find the inner corners of `board` in `frame`.
    ///
    /// On success, `corners` holds `board.corner_count()` points in row-major
    /// scan order matching [`BoardSpec::object_points`] and the method returns
    /// `true`. The buffer is owned by the caller and may hold stale data on
    /// entry; implementations overwrite it.
    fn find_board(
        &mut self,
        frame: &Self::Frame,
        board: &BoardSpec,
        corners: &mut Vec<Point2<f64>>,
    ) -> bool;
}

impl<D: BoardDetector + ?Sized> BoardDetector for &mut D {
    type Frame = D::Frame;

    fn find_board(
        &mut self,
        frame: &Self::Frame,
        board: &BoardSpec,
        corners: &mut Vec<Point2<f64>>,
    ) -> bool {
        (**self).find_board(frame, board, corners)
    }
}
