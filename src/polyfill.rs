// Two level polyfill for the f64 `powf` function used by the decay policies.
// Using it in a no_std context falls back to libm's manual
// implementation from musl's libc.
use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(feature = "std")] {
        #[inline(always)]
        pub(crate) fn powf(base: f64, exp: f64) -> f64 {
            base.powf(exp)
        }
    } else {
        #[inline(always)]
        pub(crate) fn powf(base: f64, exp: f64) -> f64 {
            libm::pow(base, exp)
        }
    }
}
