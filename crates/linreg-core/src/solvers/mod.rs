// =============================================================================
// Least Squares Solvers
// =============================================================================
//
// We want the coefficient vector A that minimizes ‖Y - XA‖². Setting the
// gradient to zero gives the normal equations:
//
//     (XᵗX) A = Xᵗ Y
//
// The textbook closed form A = (XᵗX)⁻¹XᵗY is never evaluated literally here.
// Forming an explicit inverse is slower and loses accuracy, and when XᵗX is
// (nearly) singular it quietly returns garbage. Instead we factor:
//
//   - QR:        X = QR, then solve R A = QᵗY by back substitution.
//                Works on X directly, so conditioning is not squared.
//   - Cholesky:  XᵗX = LLᵗ, then two triangular solves.
//                Cheaper for tall X, but sees cond(X)².
//
// Columns of X are scaled to unit norm first, so the rank check sees
// collinearity rather than units. Both report rank deficiency as
// `SingularMatrix` by inspecting the diagonal of the triangular factor.
//
// =============================================================================

mod ols;

pub use ols::{solve_ols, OlsConfig, OlsSolution, SolveMethod};
