/// A set of variational parameters whose numerical health can be checked
/// after every update
pub trait VariationalParam {
    /// Name of the first quantity holding a NaN/Inf or a value outside its
    /// support, if any
    fn first_invalid(&self) -> Option<&'static str>;

    fn is_valid(&self) -> bool {
        self.first_invalid().is_none()
    }
}
