pub mod ode_solvers;
